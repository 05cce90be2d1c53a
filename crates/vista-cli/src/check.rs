//! Sanity checks for viewer configuration files

use std::fmt;

use vista_core::{CameraPose, ViewerConfig};

/// Problem found in a config that still parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn finding(field: impl Into<String>, message: impl Into<String>) -> Finding {
    Finding {
        field: field.into(),
        message: message.into(),
    }
}

fn check_pose(field: &str, pose: &CameraPose, findings: &mut Vec<Finding>) {
    if pose.position == pose.target {
        findings.push(finding(field, "camera position equals its target"));
    }
    if !(pose.fov > 0.0 && pose.fov < 180.0) {
        findings.push(finding(field, format!("fov {} is outside (0, 180)", pose.fov)));
    }
}

/// Everything suspicious about `config`; empty when it looks fine
pub fn inspect(config: &ViewerConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !config.shadow.resolution.is_power_of_two() {
        findings.push(finding(
            "shadowResolution",
            format!("{} is not a power of two", config.shadow.resolution),
        ));
    }
    if config.lighting.exposure <= 0.0 {
        findings.push(finding("exposure", "exposure must be positive"));
    }
    if !(0.0..=1.0).contains(&config.shadow.darkness) {
        findings.push(finding("shadowDarkness", "darkness should be within [0, 1]"));
    }
    if config.placement.scale.to_array().contains(&0.0) {
        findings.push(finding("buildingScale", "a zero scale hides the building"));
    }

    check_pose("camera", &config.camera, &mut findings);
    for (index, pose) in config.sections.iter().enumerate() {
        check_pose(&format!("sectionCameras[{}]", index), pose, &mut findings);
    }

    for (index, transition) in config.transitions.iter().enumerate() {
        let field = format!("transitions[{}]", index);
        if transition.landmark.trim().is_empty() {
            findings.push(finding(&field, "landmark id is empty"));
        }
        if transition.start == transition.end {
            findings.push(finding(&field, "start and end anchors are identical"));
        }
        check_pose(&format!("{}.from", field), &transition.from, &mut findings);
        check_pose(&format!("{}.to", field), &transition.to, &mut findings);
    }

    findings
}

/// Short human-readable description of a config
pub fn summary(config: &ViewerConfig) -> String {
    let camera = config.camera.snapshot();
    let lighting = &config.lighting;
    let shadow = &config.shadow;
    let mut lines = vec![
        format!(
            "Camera: pos [{:.2}, {:.2}, {:.2}] target [{:.2}, {:.2}, {:.2}] zoom {:.2} rotate {:.1}° fov {}°",
            camera.pos[0], camera.pos[1], camera.pos[2],
            camera.target[0], camera.target[1], camera.target[2],
            camera.zoom, camera.rotate, camera.fov,
        ),
        format!(
            "Lighting: ambient {} {}, directional {} {}, environment {} @ {}, tone mapping {}, exposure {}",
            lighting.ambient_intensity,
            lighting.ambient_color,
            lighting.directional_intensity,
            lighting.directional_color,
            lighting.env_value.label(),
            lighting.env_intensity,
            lighting.tone_mapping.label(),
            lighting.exposure,
        ),
    ];
    lines.push(if shadow.enabled {
        format!(
            "Shadows: {} quality, {}px, softness {}, darkness {}",
            shadow.quality.label(),
            shadow.resolution,
            shadow.softness,
            shadow.darkness,
        )
    } else {
        "Shadows: disabled".to_string()
    });
    lines.push(format!("Sections: {}", config.sections.len()));
    for transition in &config.transitions {
        lines.push(format!(
            "Transition #{}: {} -> {} ({:?})",
            transition.landmark, transition.start, transition.end, transition.ease
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::{Edge, ScrollAnchor};

    #[test]
    fn test_defaults_are_clean() {
        assert!(inspect(&ViewerConfig::default()).is_empty());
    }

    #[test]
    fn test_inspect_flags_problems() {
        let mut config = ViewerConfig::default();
        config.shadow.resolution = 1000;
        config.lighting.exposure = 0.0;
        config.camera = CameraPose::new(config.camera.target, config.camera.target, 23.0);
        config.transitions[0].end = ScrollAnchor::new(Edge::Top, Edge::Bottom);

        let fields: Vec<String> = inspect(&config).into_iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec!["shadowResolution", "exposure", "camera", "transitions[0]"]
        );
    }

    #[test]
    fn test_summary_mentions_sections() {
        let text = summary(&ViewerConfig::default());
        assert!(text.contains("Sections: 6"));
        assert!(text.contains("Transition #section-two: top bottom -> center center"));
        assert!(text.contains("tone mapping Neutral"));
    }
}
