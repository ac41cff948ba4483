//! KDL configuration parser

use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::model::*;

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // Convert span from kdl's miette version to our miette version
        let offset = e.span.offset();
        let len = e.span.len();
        let span = miette::SourceSpan::from((offset, len));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "display" => {
                config.display = parse_display(node)?;
            }
            "input" => {
                config.input = parse_input(node)?;
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

/// First string argument of a node, if any
fn arg_string(node: &kdl::KdlNode, index: usize) -> Option<&str> {
    node.entries().get(index).and_then(|e| e.value().as_string())
}

/// A node that must carry exactly `count` string arguments
fn string_args<'a>(
    node: &'a kdl::KdlNode,
    count: usize,
) -> Result<Vec<&'a str>, ConfigError> {
    let args: Vec<&str> = node
        .entries()
        .iter()
        .filter_map(|e| e.value().as_string())
        .collect();

    if args.len() != count {
        return Err(ConfigError::Invalid {
            message: format!(
                "`{}` expects {} string argument(s), got {}",
                node.name().value(),
                count,
                args.len()
            ),
        });
    }

    Ok(args)
}

fn parse_display(node: &kdl::KdlNode) -> Result<DisplayConfig, ConfigError> {
    let mut display = DisplayConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "timeout" => {
                    let secs = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_i64())
                        .filter(|s| *s >= 0)
                        .ok_or_else(|| ConfigError::Invalid {
                            message: "`timeout` expects a non-negative number of seconds"
                                .to_string(),
                        })?;
                    display.timeout = Duration::from_secs(secs as u64);
                }
                "keep-hidden" => {
                    display.keep_hidden = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_bool())
                        .ok_or_else(|| ConfigError::Invalid {
                            message: "`keep-hidden` expects true or false".to_string(),
                        })?;
                }
                "color" => {
                    let args = string_args(child, 2)?;
                    let role = args[0].parse::<ColorRole>().map_err(|message| {
                        ConfigError::Invalid { message }
                    })?;
                    let rgb = args[1].parse::<Rgb>().map_err(|message| {
                        ConfigError::Invalid { message }
                    })?;
                    display.colors.push((role, rgb));
                }
                "glyph" => {
                    let args = string_args(child, 2)?;
                    let target = match args[0].to_lowercase().as_str() {
                        "shift" => &mut display.glyphs.shift,
                        "ctrl" => &mut display.glyphs.ctrl,
                        "alt" => &mut display.glyphs.alt,
                        "meta" => &mut display.glyphs.meta,
                        "left" => &mut display.glyphs.left,
                        "right" => &mut display.glyphs.right,
                        other => {
                            return Err(ConfigError::Invalid {
                                message: format!("Unknown decoration glyph: {}", other),
                            });
                        }
                    };
                    *target = args[1].to_string();
                }
                name => {
                    tracing::warn!("Unknown display config option: {}", name);
                }
            }
        }
    }

    Ok(display)
}

fn parse_input(node: &kdl::KdlNode) -> Result<InputConfig, ConfigError> {
    let mut input = InputConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "class" => {
                    if let Some(class) = arg_string(child, 0) {
                        input.classes_on.push(class.to_string());
                    }
                }
                "no-class" => {
                    if let Some(class) = arg_string(child, 0) {
                        input.classes_off.push(class.to_string());
                    }
                }
                "ignore" => {
                    if let Some(event) = arg_string(child, 0) {
                        input.ignore.push(event.to_string());
                    }
                }
                "listen" => {
                    if let Some(event) = arg_string(child, 0) {
                        input.listen.push(event.to_string());
                    }
                }
                "symbol" => {
                    let args = string_args(child, 2)?;
                    input.symbols.push((args[0].to_string(), args[1].to_string()));
                }
                name => {
                    tracing::warn!("Unknown input config option: {}", name);
                }
            }
        }
    }

    Ok(input)
}
