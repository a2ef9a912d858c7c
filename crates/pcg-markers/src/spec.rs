use pcg_core::PcgError;

/// How the primary windowed statistic is post-composed into a final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum What {
    Abs,
    Rel,
    Corr,
    RelCorr,
    Norm,
    Dur,
    Width,
    Ext,
}

/// The temporal region a marker's events are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereRegion {
    S1,
    S2,
    S,
    S1S2,
    S2S1,
    Ss,
    Base,
    Q1,
    Q2,
    Q3,
    Q5,
    Q6,
    Untrigged,
    /// `where = "-"`: a no-op; evaluating this as a terminal marker is a
    /// caller bug, not a runtime condition this crate tries to paper over.
    NoOp,
}

/// How a windowed statistic is reduced across a region's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum How {
    All,
    Min,
    Max,
    MinMax,
}

/// A parsed marker name: `what_where_to_how_f_lo_f_hi`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub what: What,
    pub where_: WhereRegion,
    pub to: String,
    pub how: How,
    pub f_lo: f64,
    pub f_hi: f64,
}

/// Parse a `where` token in isolation. Also used to resolve the `to` field
/// when `what` is `rel`/`relcorr`: `to` names another region to evaluate
/// the *same* marker's primary value against, not a separate marker name.
pub(crate) fn parse_where(token: &str) -> Result<WhereRegion, ()> {
    Ok(match token {
        "s1" => WhereRegion::S1,
        "s2" => WhereRegion::S2,
        "s" => WhereRegion::S,
        "s1s2" => WhereRegion::S1S2,
        "s2s1" => WhereRegion::S2S1,
        "ss" => WhereRegion::Ss,
        "base" => WhereRegion::Base,
        "q1" => WhereRegion::Q1,
        "q2" => WhereRegion::Q2,
        "q3" => WhereRegion::Q3,
        "q5" => WhereRegion::Q5,
        "q6" => WhereRegion::Q6,
        "untrigged" => WhereRegion::Untrigged,
        "-" => WhereRegion::NoOp,
        _ => return Err(()),
    })
}

impl MarkerSpec {
    /// Parse a marker name's six underscore-joined fields.
    pub fn parse(name: &str) -> Result<Self, PcgError> {
        let fields: Vec<&str> = name.split('_').collect();
        let malformed = |reason: &str| PcgError::MalformedMarkerName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let [what, where_, to, how, f_lo, f_hi] = fields.as_slice() else {
            return Err(malformed("expected exactly 6 underscore-joined fields"));
        };

        let what = match *what {
            "abs" => What::Abs,
            "rel" => What::Rel,
            "corr" => What::Corr,
            "relcorr" => What::RelCorr,
            "norm" => What::Norm,
            "dur" => What::Dur,
            "width" => What::Width,
            "ext" => What::Ext,
            other => return Err(malformed(&format!("unknown `what` field `{other}`"))),
        };

        let where_ = parse_where(where_).map_err(|_| malformed(&format!("unknown `where` field `{where_}`")))?;

        let how = match *how {
            "all" => How::All,
            "min" => How::Min,
            "max" => How::Max,
            "minmax" => How::MinMax,
            other => return Err(malformed(&format!("unknown `how` field `{other}`"))),
        };

        let f_lo: f64 = f_lo
            .parse()
            .map_err(|_| malformed("f_lo is not a real number"))?;
        let f_hi: f64 = f_hi
            .parse()
            .map_err(|_| malformed("f_hi is not a real number"))?;

        Ok(Self {
            what,
            where_,
            to: to.to_string(),
            how,
            f_lo,
            f_hi,
        })
    }
}
