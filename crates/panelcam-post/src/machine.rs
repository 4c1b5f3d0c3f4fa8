/// The controller family a job targets. Each dialect is an immutable set
/// of code constants — no per-tenant customization, since the physical
/// controllers on the shop floor don't change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineDialect {
    Weihong,
    Syntec,
    Fanuc,
    Dsp,
    Homag,
}

impl MachineDialect {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "weihong" => Some(Self::Weihong),
            "syntec" => Some(Self::Syntec),
            "fanuc" => Some(Self::Fanuc),
            "dsp" => Some(Self::Dsp),
            "homag" => Some(Self::Homag),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Weihong => "weihong",
            Self::Syntec => "syntec",
            Self::Fanuc => "fanuc",
            Self::Dsp => "dsp",
            Self::Homag => "homag",
        }
    }
}

/// Dwell time is expressed in milliseconds on weihong controllers, seconds
/// on everything else in this workspace's fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellUnit {
    Milliseconds,
    Seconds,
}

impl DwellUnit {
    /// Render a `G04` dwell line for a 500ms pause, in this unit.
    pub fn dwell_line(self, millis: f64) -> String {
        match self {
            Self::Milliseconds => format!("G04 P{}", millis as u32),
            Self::Seconds => format!("G04 P{}", millis / 1000.0),
        }
    }
}

/// Controller-specific code constants. Built per dialect by `MachineProfile::for_dialect`.
#[derive(Debug, Clone, Copy)]
pub struct DialectCodes {
    pub comment_open: &'static str,
    pub comment_close: &'static str,
    pub program_end: &'static str,
    pub spindle_on_cw: &'static str,
    pub spindle_off: &'static str,
    pub tool_change_suffix: &'static str,
    pub dwell_unit: DwellUnit,
    /// `G81` (straight drill) or `G83` (peck drill).
    pub drilling_cycle: &'static str,
    pub retract_height_mm: f64,
    /// `Some(increment)` to prefix every emitted line with `N<n>`, stepping
    /// by `increment`; `None` to leave lines unnumbered.
    pub line_number_increment: Option<u32>,
}

const WEIHONG: DialectCodes = DialectCodes {
    comment_open: "(",
    comment_close: ")",
    program_end: "M30",
    spindle_on_cw: "M03",
    spindle_off: "M05",
    tool_change_suffix: "M06",
    dwell_unit: DwellUnit::Milliseconds,
    drilling_cycle: "G81",
    retract_height_mm: 5.0,
    line_number_increment: None,
};

const SYNTEC: DialectCodes = DialectCodes {
    comment_open: "(",
    comment_close: ")",
    program_end: "M30",
    spindle_on_cw: "M03",
    spindle_off: "M05",
    tool_change_suffix: "M06",
    dwell_unit: DwellUnit::Seconds,
    drilling_cycle: "G81",
    retract_height_mm: 5.0,
    line_number_increment: Some(10),
};

const FANUC: DialectCodes = DialectCodes {
    comment_open: "(",
    comment_close: ")",
    program_end: "M30",
    spindle_on_cw: "M03",
    spindle_off: "M05",
    tool_change_suffix: "M06",
    dwell_unit: DwellUnit::Seconds,
    drilling_cycle: "G83",
    retract_height_mm: 3.0,
    line_number_increment: Some(10),
};

const DSP: DialectCodes = DialectCodes {
    comment_open: ";",
    comment_close: "",
    program_end: "M02",
    spindle_on_cw: "M03",
    spindle_off: "M05",
    tool_change_suffix: "M06",
    dwell_unit: DwellUnit::Seconds,
    drilling_cycle: "G83",
    retract_height_mm: 3.0,
    line_number_increment: None,
};

const HOMAG: DialectCodes = DialectCodes {
    comment_open: ";",
    comment_close: "",
    program_end: "M02",
    spindle_on_cw: "M04",
    spindle_off: "M05",
    tool_change_suffix: "M06",
    dwell_unit: DwellUnit::Seconds,
    drilling_cycle: "G81",
    retract_height_mm: 5.0,
    line_number_increment: None,
};

/// Full machine profile: dialect codes plus the job-independent physical
/// defaults, all overridable by the job context per spec.
#[derive(Debug, Clone)]
pub struct MachineProfile {
    pub name: String,
    pub dialect: MachineDialect,
    pub codes: DialectCodes,
    pub decimal_places: u32,
    pub safe_height_mm: f64,
    pub default_feed_rate_cutting: f64,
    pub default_feed_rate_plunge: f64,
    pub default_spindle_rpm: f64,
    pub default_tool_diameter_mm: f64,
}

impl MachineProfile {
    pub fn for_dialect(dialect: MachineDialect) -> Self {
        let codes = match dialect {
            MachineDialect::Weihong => WEIHONG,
            MachineDialect::Syntec => SYNTEC,
            MachineDialect::Fanuc => FANUC,
            MachineDialect::Dsp => DSP,
            MachineDialect::Homag => HOMAG,
        };
        Self {
            name: dialect.name().to_string(),
            dialect,
            codes,
            decimal_places: 3,
            safe_height_mm: 10.0,
            default_feed_rate_cutting: 6000.0,
            default_feed_rate_plunge: 1500.0,
            default_spindle_rpm: 18000.0,
            default_tool_diameter_mm: 6.0,
        }
    }

    pub fn weihong() -> Self {
        Self::for_dialect(MachineDialect::Weihong)
    }

    pub fn syntec() -> Self {
        Self::for_dialect(MachineDialect::Syntec)
    }

    pub fn fanuc() -> Self {
        Self::for_dialect(MachineDialect::Fanuc)
    }

    pub fn dsp() -> Self {
        Self::for_dialect(MachineDialect::Dsp)
    }

    pub fn homag() -> Self {
        Self::for_dialect(MachineDialect::Homag)
    }

    pub fn comment(&self, text: &str) -> String {
        format!("{}{}{}", self.codes.comment_open, text, self.codes.comment_close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_from_name_round_trips() {
        for name in ["weihong", "syntec", "fanuc", "dsp", "homag"] {
            let dialect = MachineDialect::from_name(name).unwrap();
            assert_eq!(dialect.name(), name);
        }
    }

    #[test]
    fn unknown_dialect_name_is_none() {
        assert!(MachineDialect::from_name("mach3").is_none());
    }

    #[test]
    fn dsp_and_homag_use_semicolon_comments() {
        assert_eq!(MachineProfile::dsp().comment("hi"), ";hi");
        assert_eq!(MachineProfile::homag().comment("hi"), ";hi");
    }

    #[test]
    fn weihong_uses_parenthesis_comments_and_millisecond_dwell() {
        let profile = MachineProfile::weihong();
        assert_eq!(profile.comment("hi"), "(hi)");
        assert_eq!(profile.codes.program_end, "M30");
        assert_eq!(profile.codes.dwell_unit.dwell_line(500.0), "G04 P500");
    }

    #[test]
    fn non_weihong_dwell_is_in_seconds() {
        let profile = MachineProfile::syntec();
        assert_eq!(profile.codes.dwell_unit.dwell_line(500.0), "G04 P0.5");
    }

    #[test]
    fn only_syntec_and_fanuc_number_lines() {
        assert_eq!(MachineProfile::syntec().codes.line_number_increment, Some(10));
        assert_eq!(MachineProfile::fanuc().codes.line_number_increment, Some(10));
        assert_eq!(MachineProfile::weihong().codes.line_number_increment, None);
        assert_eq!(MachineProfile::dsp().codes.line_number_increment, None);
        assert_eq!(MachineProfile::homag().codes.line_number_increment, None);
    }
}
