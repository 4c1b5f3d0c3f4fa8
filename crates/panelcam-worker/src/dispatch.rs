use std::io::Write as _;

use panelcam_calc::{generate_panels, CabinetSpec, Panel};
use panelcam_core::{ArtifactKind, EffectiveSettings, Job, JobContext, RequestOverrides};
use panelcam_dxf::write_sheet_dxf;
use panelcam_pack::{pack, PackablePanel, PackerConfig};
use panelcam_pipeline::PipelineContext;
use panelcam_post::{cut_path_from_contour, transliterate, GCodeEmitter, MachineDialect, MachineProfile};
use serde_json::{json, Value};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::DispatchError;
use crate::manifest::{manifest_key, PanelPlacement};

/// Result of a successful dispatch: the bytes to store, the artifact kind
/// they're stored under, and any kind-specific metadata for `Job::result`.
pub struct DispatchOutput {
    pub bytes: Vec<u8>,
    pub kind: ArtifactKind,
    pub result: Option<Value>,
    /// Extra objects to store alongside the primary artifact (DXF's
    /// manifest sidecar).
    pub side_effects: Vec<(String, Vec<u8>, &'static str)>,
}

fn resolve_machine_profile(name: &str) -> Result<MachineProfile, DispatchError> {
    let dialect = MachineDialect::from_name(name).ok_or_else(|| DispatchError::UnknownMachineProfile(name.to_string()))?;
    Ok(MachineProfile::for_dialect(dialect))
}

fn resolve_settings(ctx: &PipelineContext, request: &RequestOverrides) -> EffectiveSettings {
    panelcam_core::merge(request, &ctx.factory, &ctx.defaults)
}

fn panels_from_raw(raw_panels: &[Value], settings: &EffectiveSettings) -> Result<Vec<Panel>, DispatchError> {
    let mut panels = Vec::new();
    for entry in raw_panels {
        if let Ok(spec) = serde_json::from_value::<CabinetSpec>(entry.clone()) {
            let (mut generated, warnings) =
                generate_panels(&spec, settings).map_err(DispatchError::Calc)?;
            for warning in warnings {
                tracing::warn!(%warning, "panel calculator warning");
            }
            panels.append(&mut generated);
        } else {
            let panel: Panel = serde_json::from_value(entry.clone())
                .map_err(|e| DispatchError::MalformedPayload(format!("panel entry: {e}")))?;
            panels.push(panel);
        }
    }
    Ok(panels)
}

pub async fn dispatch_dxf(ctx: &PipelineContext, job: &Job) -> Result<DispatchOutput, DispatchError> {
    let JobContext::Dxf { panels: raw_panels, sheet_width, sheet_height, optimize, gap_mm, .. } = &job.context else {
        return Err(DispatchError::MalformedPayload("expected DXF context".into()));
    };

    let settings = resolve_settings(ctx, &RequestOverrides::default());
    let panels = panels_from_raw(raw_panels, &settings)?;

    let packable: Vec<PackablePanel> = panels
        .iter()
        .map(|p| PackablePanel { id: p.name.clone(), width_mm: p.width_mm, height_mm: p.height_mm, can_rotate: true })
        .collect();

    let config = PackerConfig {
        sheet_width_mm: *sheet_width,
        sheet_length_mm: *sheet_height,
        gap_mm: *gap_mm,
        edge_margin_mm: 10.0,
        allow_rotation: *optimize,
    };

    let result = pack(&packable, &config).map_err(DispatchError::Pack)?;
    let sheet = result.sheets.first().ok_or(DispatchError::MalformedPayload("packer produced no sheets".into()))?;
    if result.sheets.len() > 1 {
        tracing::warn!(job_id = %job.id, extra_sheets = result.sheets.len() - 1, "cut layout spans multiple sheets, only the first is emitted as this job's DXF");
    }

    let bytes = write_sheet_dxf(sheet, &panels, result.unplaced.len()).map_err(DispatchError::Dxf)?;

    let placements: Vec<PanelPlacement> = sheet
        .parts
        .iter()
        .filter_map(|placed| {
            panels.iter().find(|p| p.name == placed.id).map(|panel| PanelPlacement::from_panel_and_rect(panel, placed.rect, placed.rotated))
        })
        .collect();
    let manifest_bytes = serde_json::to_vec(&placements).map_err(|e| DispatchError::MalformedPayload(e.to_string()))?;
    let dxf_key = ArtifactKind::Dxf.storage_key(job.id);

    let result_json = json!({
        "utilization": result.overall_utilization,
        "placed": sheet.parts.len(),
        "unplaced": result.unplaced.len(),
    });

    Ok(DispatchOutput {
        bytes,
        kind: ArtifactKind::Dxf,
        result: Some(result_json),
        side_effects: vec![(manifest_key(&dxf_key), manifest_bytes, "application/json")],
    })
}

pub async fn dispatch_gcode(ctx: &PipelineContext, job: &Job) -> Result<DispatchOutput, DispatchError> {
    let JobContext::Gcode {
        dxf_artifact_id,
        machine_profile,
        spindle_speed,
        feed_rate_cutting,
        feed_rate_plunge,
        cut_depth,
        safe_height,
        tool_diameter,
        ..
    } = &job.context
    else {
        return Err(DispatchError::MalformedPayload("expected GCODE context".into()));
    };

    let dxf_key = ArtifactKind::Dxf.storage_key(*dxf_artifact_id);
    let manifest_bytes = ctx.store.get(&manifest_key(&dxf_key)).await.map_err(|_| DispatchError::MissingArtifact(*dxf_artifact_id))?;
    let placements: Vec<PanelPlacement> =
        serde_json::from_slice(&manifest_bytes).map_err(|e| DispatchError::MalformedPayload(e.to_string()))?;

    let request = RequestOverrides {
        machine_profile: Some(machine_profile.clone()),
        spindle_speed_rpm: *spindle_speed,
        feed_rate_cutting_mm_min: *feed_rate_cutting,
        feed_rate_plunge_mm_min: *feed_rate_plunge,
        cut_depth_mm: *cut_depth,
        safe_height_mm: *safe_height,
        tool_diameter_mm: *tool_diameter,
        ..Default::default()
    };
    let settings = resolve_settings(ctx, &request);
    let profile = resolve_machine_profile(&settings.machine_profile)?;
    let emitter = GCodeEmitter::new(&profile);

    // No standalone step-down setting exists; the tool's own diameter is a
    // conservative per-pass depth that always satisfies `step_down <= tool_diameter`.
    let step_down_mm = settings.tool_diameter_mm;

    let mut program = String::new();
    for (i, placement) in placements.iter().enumerate() {
        let toolpath = cut_path_from_contour(
            placement.origin,
            placement.width_mm,
            placement.height_mm,
            settings.cut_depth_mm,
            step_down_mm,
            settings.safe_height_mm,
            1,
            settings.spindle_speed_rpm,
            settings.feed_rate_cutting_mm_min,
            settings.feed_rate_plunge_mm_min,
        );
        let panel = placement.as_panel();
        let block = emitter.emit_cut_path(&panel, &toolpath, settings.cut_depth_mm, step_down_mm, settings.tool_diameter_mm)?;
        if i > 0 {
            program.push('\n');
        }
        program.push_str(&block);
    }

    Ok(DispatchOutput { bytes: program.into_bytes(), kind: ArtifactKind::Gcode, result: None, side_effects: Vec::new() })
}

pub async fn dispatch_drilling(ctx: &PipelineContext, job: &Job) -> Result<DispatchOutput, DispatchError> {
    let JobContext::Drilling { order_id, machine_profile, extra, .. } = &job.context else {
        return Err(DispatchError::MalformedPayload("expected DRILLING context".into()));
    };

    let raw_panels = extra
        .get("panels")
        .and_then(|v| v.as_array())
        .cloned()
        .ok_or_else(|| DispatchError::MalformedPayload("drilling job context is missing \"panels\"".into()))?;

    let settings = resolve_settings(ctx, &RequestOverrides { machine_profile: Some(machine_profile.clone()), ..Default::default() });
    let panels = panels_from_raw(&raw_panels, &settings)?;
    let profile = resolve_machine_profile(&settings.machine_profile)?;
    let emitter = GCodeEmitter::new(&profile);

    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip_writer = ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut file_names = Vec::with_capacity(panels.len());
        for panel in &panels {
            let program = emitter.emit_drilling(panel, settings.tool_diameter_mm, settings.spindle_speed_rpm)?;
            let file_name = format!(
                "{}_{}x{}.nc",
                transliterate(&panel.name),
                panel.width_mm as i64,
                panel.height_mm as i64,
            );
            zip_writer
                .start_file(file_name.clone(), options)
                .map_err(|e| DispatchError::Zip(e.to_string()))?;
            zip_writer.write_all(program.as_bytes()).map_err(|e| DispatchError::Zip(e.to_string()))?;
            file_names.push(file_name);
        }

        let readme = format!(
            "order: {order_id}\ngenerated: {}\nmachine profile: {machine_profile}\npanels: {}\nfiles:\n{}\n",
            chrono::Utc::now().to_rfc3339(),
            panels.len(),
            file_names.iter().map(|n| format!("  {n}")).collect::<Vec<_>>().join("\n"),
        );
        zip_writer.start_file("README.txt", options).map_err(|e| DispatchError::Zip(e.to_string()))?;
        zip_writer.write_all(readme.as_bytes()).map_err(|e| DispatchError::Zip(e.to_string()))?;

        zip_writer.finish().map_err(|e| DispatchError::Zip(e.to_string()))?;
    }

    Ok(DispatchOutput {
        bytes: buf.into_inner(),
        kind: ArtifactKind::Drilling,
        result: Some(json!({"panel_count": panels.len()})),
        side_effects: Vec::new(),
    })
}

pub async fn dispatch_zip(ctx: &PipelineContext, job: &Job) -> Result<DispatchOutput, DispatchError> {
    let JobContext::Zip { job_ids, .. } = &job.context else {
        return Err(DispatchError::MalformedPayload("expected ZIP context".into()));
    };

    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip_writer = ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for job_id in job_ids {
            let referenced = ctx.repo.get_by_id(*job_id).await?;
            if !referenced.status.is_terminal() || referenced.artifact_id.is_none() {
                return Err(DispatchError::MissingArtifact(*job_id));
            }
            let artifact_kind = match referenced.kind {
                panelcam_core::JobKind::Dxf => ArtifactKind::Dxf,
                panelcam_core::JobKind::Gcode => ArtifactKind::Gcode,
                panelcam_core::JobKind::Drilling => ArtifactKind::Drilling,
                panelcam_core::JobKind::Zip => ArtifactKind::Zip,
            };
            let key = artifact_kind.storage_key(*job_id);
            let bytes = ctx.store.get(&key).await.map_err(|_| DispatchError::MissingArtifact(*job_id))?;

            zip_writer
                .start_file(format!("{job_id}.{}", artifact_kind.extension()), options)
                .map_err(|e| DispatchError::Zip(e.to_string()))?;
            zip_writer.write_all(&bytes).map_err(|e| DispatchError::Zip(e.to_string()))?;
        }

        zip_writer.finish().map_err(|e| DispatchError::Zip(e.to_string()))?;
    }

    Ok(DispatchOutput { bytes: buf.into_inner(), kind: ArtifactKind::Zip, result: None, side_effects: Vec::new() })
}

pub async fn dispatch(ctx: &PipelineContext, job: &Job) -> Result<DispatchOutput, DispatchError> {
    match job.kind {
        panelcam_core::JobKind::Dxf => dispatch_dxf(ctx, job).await,
        panelcam_core::JobKind::Gcode => dispatch_gcode(ctx, job).await,
        panelcam_core::JobKind::Drilling => dispatch_drilling(ctx, job).await,
        panelcam_core::JobKind::Zip => dispatch_zip(ctx, job).await,
    }
}

/// Store the dispatch output's bytes (and any side-effect objects) and
/// attach the resulting artifact id to the job record.
pub async fn store_output(ctx: &PipelineContext, job: &Job, output: DispatchOutput) -> Result<Uuid, DispatchError> {
    let key = output.kind.storage_key(job.id);
    ctx.store.put(&key, output.bytes, output.kind.content_type()).await?;
    for (side_key, side_bytes, content_type) in output.side_effects {
        ctx.store.put(&side_key, side_bytes, content_type).await?;
    }

    let artifact_id = Uuid::new_v4();
    ctx.repo.attach_artifact(job.id, artifact_id, output.result).await?;
    Ok(artifact_id)
}
