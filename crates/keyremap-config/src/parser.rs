//! KDL rule-set parser

use std::path::Path;

use keyremap_core::{parse_key, parse_shortcut, KeyInput, RemapRow};

use crate::error::{ConfigError, InvalidKeyInfo, KeyPosition, SourceLocation};
use crate::model::*;

/// Extract source location from a KDL node's name span
fn get_node_location(node: &kdl::KdlNode, source: &str) -> SourceLocation {
    let span = node.name().span();
    let (line, column) = offset_to_line_col(source, span.offset());
    SourceLocation::new(line, column, span.offset(), span.len())
}

/// Extract source location from a KDL entry (for target values)
fn get_entry_location(entry: &kdl::KdlEntry, source: &str) -> SourceLocation {
    let span = entry.span();
    let (line, column) = offset_to_line_col(source, span.offset());
    SourceLocation::new(line, column, span.offset(), span.len())
}

/// Convert byte offset to line and column (1-indexed)
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// First positional argument of a node
fn first_argument(node: &kdl::KdlNode) -> Option<&kdl::KdlEntry> {
    node.entries().iter().find(|e| e.name().is_none())
}

/// String value of a named property
fn string_property<'a>(node: &'a kdl::KdlNode, name: &str) -> Option<&'a str> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(name))
        .and_then(|e| e.value().as_string())
}

/// Parse a rule set from the given path
///
/// A leading `~` is expanded to the home directory.
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let content = std::fs::read_to_string(expanded)?;
    parse_config_str(&content)
}

/// Parse a rule set from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl reports spans with its own miette version
        let span = miette::SourceSpan::from((e.span.offset(), e.span.len()));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();
    let mut remap_blocks = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "global" => {
                config.global = parse_global(node)?;
            }
            "remap" => remap_blocks.push(node),
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    // Blocks are parsed after `global` so `default-app-name` applies to all of them
    let mut all_invalid_keys = Vec::new();
    for block in remap_blocks {
        let rows = parse_remap_block(block, &config.global, content, &mut all_invalid_keys)?;
        config.rules.rows.extend(rows);
    }

    if !all_invalid_keys.is_empty() {
        return Err(ConfigError::InvalidKeys {
            src: content.to_string(),
            invalid_keys: all_invalid_keys,
        });
    }

    tracing::info!("Loaded {} remap rule(s)", config.rules.len());
    Ok(config)
}

fn parse_global(node: &kdl::KdlNode) -> Result<GlobalConfig, ConfigError> {
    let mut global = GlobalConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "log-level" => {
                    if let Some(val) = first_argument(child).and_then(|e| e.value().as_string()) {
                        global.log_level = val
                            .parse()
                            .map_err(|e| ConfigError::Invalid { message: e })?;
                    }
                }
                "default-app-name" => {
                    if let Some(val) = first_argument(child).and_then(|e| e.value().as_string()) {
                        if val.trim().is_empty() {
                            return Err(ConfigError::Invalid {
                                message: "default-app-name cannot be empty".to_string(),
                            });
                        }
                        global.default_app_name = val.to_string();
                    }
                }
                name => {
                    tracing::warn!("Unknown global config option: {}", name);
                }
            }
        }
    }

    Ok(global)
}

/// Parse one `remap` block.
///
/// Each child is a rule: the node name is the source, the first argument
/// the target, and an optional `app` property overrides the block's `app`.
/// Unparseable keys are appended to `invalid_keys` so that every bad key in
/// the file is reported at once.
fn parse_remap_block(
    node: &kdl::KdlNode,
    global: &GlobalConfig,
    source: &str,
    invalid_keys: &mut Vec<InvalidKeyInfo>,
) -> Result<Vec<RemapRow>, ConfigError> {
    let block_app = string_property(node, "app").unwrap_or_default();
    let mut rows = Vec::new();

    let Some(children) = node.children() else {
        return Ok(rows);
    };

    for child in children.nodes() {
        let source_text = child.name().value();
        let source_input = parse_input(source_text).map_err(|reason| {
            InvalidKeyInfo::new(
                source_text,
                KeyPosition::Source,
                reason,
                get_node_location(child, source),
            )
        });

        let Some(target_entry) = first_argument(child) else {
            let location = get_node_location(child, source);
            return Err(ConfigError::MissingField {
                field: format!("target for '{}' (e.g., `\"{}\" \"Esc\"`)", source_text, source_text),
                src: source.to_string(),
                span: location.span(),
            });
        };

        let target_input = match target_entry.value().as_string() {
            Some(target_text) => parse_input(target_text).map_err(|reason| {
                InvalidKeyInfo::new(
                    target_text,
                    KeyPosition::Target,
                    reason,
                    get_entry_location(target_entry, source),
                )
            }),
            None => Err(InvalidKeyInfo::new(
                target_entry.value().to_string(),
                KeyPosition::Target,
                "expected a quoted key name",
                get_entry_location(target_entry, source),
            )),
        };

        let app = string_property(child, "app").unwrap_or(block_app);

        match (source_input, target_input) {
            (Ok(from), Ok(to)) => {
                rows.push(RemapRow::new(from, to).for_app(global.normalize_app(app)));
            }
            (from, to) => {
                invalid_keys.extend(from.err());
                invalid_keys.extend(to.err());
            }
        }
    }

    Ok(rows)
}

/// Text containing `+` is a shortcut, anything else a single key.
fn parse_input(text: &str) -> Result<KeyInput, String> {
    if text.contains('+') {
        parse_shortcut(text)
            .map(KeyInput::Shortcut)
            .map_err(|e| e.to_string())
    } else {
        parse_key(text)
            .map(KeyInput::Key)
            .ok_or_else(|| format!("unknown key '{}'", text.trim()))
    }
}
