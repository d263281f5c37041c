use chrono::{DateTime, Utc};
use ied_domain::config::InferenceMode;
use ied_model::{DataType, MmsValue};

/// Turns the raw text of a bridge command into a typed value.
pub trait ValueInference: Send + Sync {
    /// `declared` is the target attribute's type, when known. `None` means the
    /// text cannot be expressed as a value and the command is dropped.
    fn infer(&self, raw: &str, declared: Option<DataType>) -> Option<MmsValue>;
}

impl<T: ValueInference + ?Sized> ValueInference for Box<T> {
    fn infer(&self, raw: &str, declared: Option<DataType>) -> Option<MmsValue> {
        (**self).infer(raw, declared)
    }
}

/// Strategy configured by [`InferenceMode`].
#[must_use]
pub fn for_mode(mode: InferenceMode) -> Box<dyn ValueInference> {
    match mode {
        InferenceMode::Heuristic => Box::new(HeuristicInference),
        InferenceMode::Schema => Box::new(SchemaInference),
    }
}

/// Shape-based inference that ignores the declared type.
///
/// * `true` / `false` in any case → Boolean
/// * text containing `.` → Float32, from the longest numeric prefix (`"1.5x"` → 1.5)
/// * anything else → Int32, from the longest integer prefix (`"abc"` → 0), saturating
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicInference;

impl ValueInference for HeuristicInference {
    fn infer(&self, raw: &str, _declared: Option<DataType>) -> Option<MmsValue> {
        Some(heuristic(raw))
    }
}

/// Declared-type inference; unknown shapes fall back to [`HeuristicInference`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaInference;

impl ValueInference for SchemaInference {
    fn infer(&self, raw: &str, declared: Option<DataType>) -> Option<MmsValue> {
        let text = raw.trim();
        let typed = declared.and_then(|declared| match declared {
            DataType::Boolean => parse_bool(text)
                .or(match text {
                    "1" => Some(true),
                    "0" => Some(false),
                    _ => None,
                })
                .map(MmsValue::Boolean),
            DataType::Int32 => text.parse().ok().map(MmsValue::Int32),
            DataType::Unsigned32 => text.parse().ok().map(MmsValue::Unsigned32),
            DataType::Float32 => text.parse().ok().map(MmsValue::Float32),
            DataType::VisibleString => Some(MmsValue::VisibleString(raw.to_owned())),
            DataType::UtcTime => parse_time(text).map(MmsValue::UtcTime),
            DataType::Constructed => None,
        });
        typed.or_else(|| Some(heuristic(raw)))
    }
}

fn heuristic(raw: &str) -> MmsValue {
    if let Some(b) = parse_bool(raw) {
        MmsValue::Boolean(b)
    } else if raw.contains('.') {
        MmsValue::Float32(atof(raw))
    } else {
        MmsValue::Int32(atoi(raw))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// RFC 3339 text or milliseconds since the Unix epoch.
fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| text.parse().ok().and_then(DateTime::from_timestamp_millis))
}

const fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn skip_space(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| is_c_space(**b)).count()
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Integer prefix parse: leading whitespace, optional sign, decimal digits.
pub(crate) fn atoi(raw: &str) -> i32 {
    let bytes = raw.as_bytes();
    let mut i = skip_space(bytes);

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        },
        Some(b'+') => {
            i += 1;
            false
        },
        _ => false,
    };

    let mut value: i64 = 0;
    for &b in &bytes[i..i + digits(&bytes[i..])] {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let value = if negative { -value } else { value };
    i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

/// Floating-point prefix parse: leading whitespace, optional sign, digits with
/// an optional fraction, then an optional exponent.
pub(crate) fn atof(raw: &str) -> f32 {
    let bytes = raw.as_bytes();
    let start = skip_space(bytes);
    let mut end = start;

    if matches!(bytes.get(end), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    raw[start..end].parse::<f64>().map_or(0.0, |v| v as f32)
}
