use serde::{Deserialize, Serialize};

/// A cutting tool, used by the postprocessor's tool-diameter invariants
/// and feed-rate defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub number: u32,
    pub tool_type: ToolType,
    pub diameter_mm: f64,
    pub flutes: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Endmill,
    Drill,
}

impl Tool {
    /// The workhorse router bit for sheet-goods cabinet work.
    pub fn default_endmill() -> Self {
        Self {
            number: 1,
            tool_type: ToolType::Endmill,
            diameter_mm: 6.0,
            flutes: 2,
            description: "6mm 2-flute upcut endmill".into(),
        }
    }

    pub fn radius_mm(&self) -> f64 {
        self.diameter_mm / 2.0
    }

    /// Basic wood feed rate in mm/min: rpm * flutes * chip_load_mm.
    pub fn recommended_feed_rate(&self, rpm: f64) -> f64 {
        let chip_load_mm = match self.tool_type {
            ToolType::Endmill => {
                if self.diameter_mm <= 6.0 {
                    0.13
                } else if self.diameter_mm <= 12.0 {
                    0.3
                } else {
                    0.45
                }
            }
            ToolType::Drill => 0.08,
        };
        rpm * self.flutes as f64 * chip_load_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endmill_radius() {
        let tool = Tool::default_endmill();
        assert!((tool.radius_mm() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn feed_rate_scales_with_rpm_and_flutes() {
        let tool = Tool::default_endmill();
        let feed = tool.recommended_feed_rate(18000.0);
        assert!((feed - 18000.0 * 2.0 * 0.13).abs() < 1e-6);
    }
}
