use pcg_core::{ReferenceEvent, Window};

/// A refined candidate kept alive only for the duration of clustering: the
/// arena element the reference implementation represented with pointers
/// and an intrusive stack, here an index into a flat `Vec`.
#[derive(Debug, Clone)]
pub(crate) struct ExtendedEvent {
    pub ref_offset: usize,
    pub refined_offset: usize,
    pub energy: f32,
    pub assigned: bool,
}

fn argmax_in_window(energy: &[f32], window: Window, center: usize) -> Option<(usize, f32)> {
    let range = window.range_at(center, energy.len())?;
    energy[range.clone()]
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (range.start + i, v))
}

/// Build the extended-event arena from crude events: refine each offset to
/// the local energy-signal maximum within the lookaround window, dropping
/// events whose window would fall outside the signal.
pub(crate) fn intake(
    events: &[ReferenceEvent],
    energy: &[f32],
    lookaround: Window,
) -> Vec<ExtendedEvent> {
    events
        .iter()
        .filter_map(|e| {
            let (refined_offset, energy_at) = argmax_in_window(energy, lookaround, e.offset)?;
            Some(ExtendedEvent {
                ref_offset: e.offset,
                refined_offset,
                energy: energy_at,
                assigned: false,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refines_to_local_energy_peak() {
        let mut energy = vec![0.0f32; 1000];
        energy[505] = 3.0;
        let lookaround = Window::new(100, 50);
        let events = [ReferenceEvent { offset: 500 }];
        let arena = intake(&events, &energy, lookaround);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[0].refined_offset, 505);
        assert_eq!(arena[0].energy, 3.0);
    }

    #[test]
    fn drops_events_with_out_of_range_window() {
        let energy = vec![0.0f32; 1000];
        let lookaround = Window::new(100, 50);
        let events = [ReferenceEvent { offset: 980 }];
        let arena = intake(&events, &energy, lookaround);
        assert!(arena.is_empty());
    }
}
