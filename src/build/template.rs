//! Output path templates
//!
//! A template such as `dist/{{.Dir}}_{{.OS}}_{{.Arch}}` is parsed once when
//! the configuration is loaded, so a malformed template fails before any
//! build starts. The leading dot is optional (`{{Dir}}` works too).

use crate::error::{hints, GoxError};

/// Template used when no `--output` is given
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "{{.Dir}}_{{.OS}}_{{.Arch}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Dir,
    Os,
    Arch,
}

/// Values substituted into an output template
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub dir: &'a str,
    pub os: &'a str,
    pub arch: &'a str,
}

/// A parsed output path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl OutputTemplate {
    pub fn parse(source: &str) -> Result<Self, GoxError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| template_error(source, "unclosed action"))?;

            let name = after_open[..end].trim();
            let name = name.strip_prefix('.').unwrap_or(name);
            segments.push(match name {
                "Dir" => Segment::Dir,
                "OS" => Segment::Os,
                "Arch" => Segment::Arch,
                other => {
                    return Err(template_error(
                        source,
                        &format!("unknown variable \"{}\"", other),
                    ))
                }
            });

            rest = &after_open[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn render(&self, vars: &TemplateVars<'_>) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Dir => vars.dir,
                Segment::Os => vars.os,
                Segment::Arch => vars.arch,
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            segments: vec![
                Segment::Dir,
                Segment::Literal("_".to_string()),
                Segment::Os,
                Segment::Literal("_".to_string()),
                Segment::Arch,
            ],
        }
    }
}

fn template_error(source: &str, reason: &str) -> GoxError {
    GoxError::config_error_with_hint(
        format!("invalid output template {:?}: {}", source, reason),
        None,
        hints::output_template(),
    )
}

/// Last element of an import path, used as the `Dir` template variable
pub fn base_name(entry_point: &str) -> &str {
    let trimmed = entry_point.trim_end_matches(['/', '\\']);
    match trimmed.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => ".",
    }
}
