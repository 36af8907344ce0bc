use std::collections::HashMap;

use crate::error::MountError;

/// Mount options keyed by option name. Flag options carry an empty value.
pub type MountOptions = HashMap<String, String>;

const FIELD_COUNT: usize = 6;

/// One mount-table line, split into its meaningful fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMount {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: MountOptions,
}

/// Parses a line of the form `<device> <mountpoint> <fstype> <options> <dump> <pass>`.
///
/// Dump and pass are required to be present but are otherwise ignored. Any
/// other field count is a [`MountError::Parse`]; callers skip such lines.
pub fn parse_line(line: &str) -> Result<ParsedMount, MountError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [device, mount_point, fs_type, options, _dump, _pass] = fields.as_slice() else {
        return Err(MountError::Parse {
            line: line.to_string(),
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    };

    Ok(ParsedMount {
        device: unescape(device),
        mount_point: unescape(mount_point),
        fs_type: fs_type.to_string(),
        options: parse_options(options),
    })
}

/// Splits a comma separated option field.
///
/// Each option is split once, on its first `=`: `vers=4` becomes
/// `vers -> 4`, `rw` becomes `rw -> ""` and `a=b=c` becomes `a -> b=c`.
/// Empty tokens are dropped and a repeated key keeps its last value.
pub fn parse_options(options: &str) -> MountOptions {
    options
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (token.to_string(), String::new()),
        })
        .collect()
}

// The kernel writes space, tab, newline and backslash as three-digit octal
// escapes (`\040`, `\011`, `\012`, `\134`).
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let digits = &field[i + 1..i + 4];
            if let Ok(value) = u8::from_str_radix(digits, 8) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
