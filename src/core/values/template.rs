//! Display template substitution.
//!
//! Templates use `{key}` and `{key:spec}` placeholders, with `{{` and `}}` for
//! literal braces. The spec follows the familiar mini-language
//! `[[fill]align][+][0][width][.precision][type]` with types `f`, `d`, `s`,
//! `e` and `%`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::value::MetricValue;
use crate::error::{ObidomeError, Result};

static SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<fill>.)?(?P<align>[<>^]))?(?P<sign>\+)?(?P<zero>0)?(?P<width>\d+)?(?:\.(?P<precision>\d+))?(?P<kind>[fdse%])?$",
    )
    .expect("format spec pattern is valid")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<char>,
    sign: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let caps = SPEC_RE.captures(spec)?;
        let char_of = |name: &str| caps.name(name).and_then(|m| m.as_str().chars().next());

        Some(Self {
            fill: char_of("fill"),
            align: char_of("align"),
            sign: caps.name("sign").is_some(),
            zero: caps.name("zero").is_some(),
            width: caps
                .name("width")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
            precision: caps.name("precision").and_then(|m| m.as_str().parse().ok()),
            kind: char_of("kind"),
        })
    }
}

/// Substitute every placeholder in `template` with values from `lookup`.
///
/// Never fails: a malformed template is returned verbatim (with a warning), and
/// a spec that does not fit the value's type falls back to the value's plain text.
pub fn format_template<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> MetricValue,
{
    match render(template, &mut lookup) {
        Ok(rendered) => rendered,
        Err(e) => {
            log::warn!("Malformed display template: {}", e);
            template.to_string()
        }
    }
}

fn render<F>(template: &str, lookup: &mut F) -> Result<String>
where
    F: FnMut(&str) -> MetricValue,
{
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(ObidomeError::template("nested '{' in placeholder")),
                        _ => field.push(c),
                    }
                }
                if !closed {
                    return Err(ObidomeError::template(format!(
                        "unclosed placeholder '{{{}'",
                        field
                    )));
                }
                out.push_str(&render_field(&field, lookup)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(ObidomeError::template("single '}' outside a placeholder")),
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn render_field<F>(field: &str, lookup: &mut F) -> Result<String>
where
    F: FnMut(&str) -> MetricValue,
{
    let (key, spec) = match field.split_once(':') {
        Some((key, spec)) => (key, spec),
        None => (field, ""),
    };

    if key.is_empty() {
        return Err(ObidomeError::template("empty placeholder name"));
    }

    let value = lookup(key);

    match FormatSpec::parse(spec) {
        Some(spec) => Ok(apply_spec(&value, &spec)),
        None => {
            log::warn!("Unsupported format spec '{}' for '{}'", spec, key);
            Ok(value.to_string())
        }
    }
}

fn apply_spec(value: &MetricValue, spec: &FormatSpec) -> String {
    let numeric = value.as_f64();

    let body = match (spec.kind, value, numeric) {
        (Some('f'), _, Some(n)) => fixed(n, spec.precision.unwrap_or(6)),
        (Some('%'), _, Some(n)) => format!("{}%", fixed(n * 100.0, spec.precision.unwrap_or(6))),
        (Some('e'), _, Some(n)) => exponent(n, spec.precision.unwrap_or(6)),
        (Some('d'), MetricValue::Int(i), _) => i.to_string(),
        (Some('d'), MetricValue::Float(x), _) if x.is_finite() => format!("{}", x.round() as i64),
        (None, MetricValue::Float(x), _) if spec.precision.is_some() => {
            fixed(*x, spec.precision.unwrap_or(6))
        }
        (None | Some('s'), MetricValue::Str(s), _) => match spec.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.clone(),
        },
        _ => value.to_string(),
    };

    let is_number = numeric.is_some() && !matches!(spec.kind, Some('s'));
    let body = if spec.sign && is_number && !body.starts_with('-') {
        format!("+{}", body)
    } else {
        body
    };

    pad(body, spec, is_number)
}

fn fixed(n: f64, precision: usize) -> String {
    format!("{:.*}", precision, n)
}

/// `1.5e3` style output rewritten as `1.500000e+03`
fn exponent(n: f64, precision: usize) -> String {
    let raw = format!("{:.*e}", precision, n);
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => raw,
        },
        None => raw,
    }
}

fn pad(body: String, spec: &FormatSpec, is_number: bool) -> String {
    let len = body.chars().count();
    if len >= spec.width {
        return body;
    }
    let missing = spec.width - len;

    // Zero padding goes between the sign and the digits
    if spec.zero && spec.align.is_none() && is_number {
        let (sign, digits) = match body.chars().next() {
            Some(c @ ('+' | '-')) => (c.to_string(), body[1..].to_string()),
            _ => (String::new(), body),
        };
        return format!("{}{}{}", sign, "0".repeat(missing), digits);
    }

    let fill = spec.fill.unwrap_or(' ').to_string();
    let align = spec.align.unwrap_or(if is_number { '>' } else { '<' });

    match align {
        '<' => format!("{}{}", body, fill.repeat(missing)),
        '^' => {
            let left = missing / 2;
            format!("{}{}{}", fill.repeat(left), body, fill.repeat(missing - left))
        }
        _ => format!("{}{}", fill.repeat(missing), body),
    }
}
