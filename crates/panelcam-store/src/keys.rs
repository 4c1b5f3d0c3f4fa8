use panelcam_core::ArtifactKind;
use uuid::Uuid;

/// Build the structured object key for an artifact: `<kind>/<job_id>.<ext>`.
pub fn artifact_key(kind: ArtifactKind, job_id: Uuid) -> String {
    kind.storage_key(job_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dxf_key_has_expected_shape() {
        let id = Uuid::nil();
        assert_eq!(artifact_key(ArtifactKind::Dxf, id), format!("dxf/{id}.dxf"));
    }

    #[test]
    fn gcode_key_uses_gcode_extension() {
        let id = Uuid::nil();
        assert_eq!(artifact_key(ArtifactKind::Gcode, id), format!("gcode/{id}.gcode"));
    }
}
