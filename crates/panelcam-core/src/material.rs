use serde::{Deserialize, Serialize};

/// A sheet material a panel can be cut from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Display name, e.g. "ЛДСП 16мм" or "Birch Ply 18mm".
    pub name: String,
    pub thickness_mm: f64,
    pub sheet_width_mm: f64,
    pub sheet_length_mm: f64,
}

impl Material {
    pub fn ldsp_16() -> Self {
        Self {
            name: "ЛДСП 16мм".into(),
            thickness_mm: 16.0,
            sheet_width_mm: 2800.0,
            sheet_length_mm: 2070.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ldsp_16_dimensions() {
        let m = Material::ldsp_16();
        assert!((m.thickness_mm - 16.0).abs() < 1e-9);
        assert!((m.sheet_width_mm - 2800.0).abs() < 1e-9);
    }

    #[test]
    fn material_serde_round_trip() {
        let m = Material::ldsp_16();
        let json = serde_json::to_string(&m).unwrap();
        let back: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, m.name);
    }
}
