use core::cmp::Ordering;
use core::fmt;

/// One run of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Decimal digits with leading zeros removed; zero is the empty string
    Numeric(String),
    Alpha(String),
}

impl Segment {
    const ZERO: Self = Self::Numeric(String::new());

    fn is_zero(&self) -> bool {
        matches!(self, Self::Numeric(digits) if digits.is_empty())
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// A loosely-structured version such as `5.7.mysql_aurora.2.10.2` or `1.2rc3`
///
/// The text is split into alternating runs of digits and letters; any other character
/// separates runs. Versions compare piecewise, numeric runs as integers and alphabetic
/// runs lexically, with the shorter version padded by zeros.
///
/// Where one version has a numeric run and the other an alphabetic run at the same
/// position, the numeric run sorts first. So `1.10 < 1.10rc1` and
/// `5.7 < 5.7.mysql_aurora.2.10`. Such versions are never equal.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    segments: Vec<Segment>,
}

/// Separates encoded segments; sorts below every tag, digit and letter
const SEPARATOR: char = '!';
const NUMERIC_TAG: char = '#';
const ALPHA_TAG: char = '@';

impl Version {
    /// Split a version string into segments; never fails
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut current_is_digit = false;

        for c in text.chars() {
            let is_digit = c.is_ascii_digit();
            if !is_digit && !c.is_alphabetic() {
                push_segment(&mut segments, &mut current, current_is_digit);
                continue;
            }

            if !current.is_empty() && is_digit != current_is_digit {
                push_segment(&mut segments, &mut current, current_is_digit);
            }

            current.push(c);
            current_is_digit = is_digit;
        }
        push_segment(&mut segments, &mut current, current_is_digit);

        Self {
            text: text.to_string(),
            segments,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// An order-preserving string encoding of this version
    ///
    /// Comparing keys as strings gives the same answer as comparing the versions. Trailing
    /// zero runs are dropped so that `1.0` and `1.0.0` share a key.
    #[must_use]
    pub fn sort_key(&self) -> String {
        let mut key = String::new();
        for segment in self.significant_segments() {
            match segment {
                Segment::Numeric(digits) => {
                    key.push(NUMERIC_TAG);
                    push_length(&mut key, digits.len());
                    key.push_str(digits);
                }
                Segment::Alpha(letters) => {
                    key.push(ALPHA_TAG);
                    key.push_str(letters);
                }
            }
            key.push(SEPARATOR);
        }
        key
    }

    fn significant_segments(&self) -> &[Segment] {
        let end = self.segments.iter().rposition(|s| !s.is_zero()).map_or(0, |i| i + 1);
        &self.segments[..end]
    }
}

/// Write a length so that longer lengths sort after shorter ones as text
///
/// The decimal digits are preceded by a letter giving their count, `a` for one digit.
fn push_length(key: &mut String, len: usize) {
    let digits = len.to_string();
    let width = u8::try_from(digits.len()).unwrap_or(u8::MAX);
    key.push(char::from(b'a'.saturating_add(width.saturating_sub(1))));
    key.push_str(&digits);
}

fn push_segment(segments: &mut Vec<Segment>, current: &mut String, is_digit: bool) {
    if current.is_empty() {
        return;
    }

    let run = core::mem::take(current);
    if is_digit {
        segments.push(Segment::Numeric(run.trim_start_matches('0').to_string()));
    } else {
        segments.push(Segment::Alpha(run));
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::ZERO;
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let a = self.segments.get(i).unwrap_or(&zero);
                let b = other.segments.get(i).unwrap_or(&zero);
                a.cmp(b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text)
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("10") > v("9"));
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0"));
        assert!(v("1.0") < v("1.0.1"));
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(v("1.02"), v("1.2"));
    }

    #[test]
    fn test_alphabetic_segments() {
        assert!(v("1.2a") < v("1.2b"));
        assert_eq!(v("5.7.mysql_aurora.2.10"), v("5.7.mysql_aurora.2.10"));
        assert!(v("5.7.mysql_aurora.2.09") < v("5.7.mysql_aurora.2.10"));
    }

    #[test]
    fn test_numeric_run_sorts_before_alphabetic_run() {
        assert_ne!(v("1.a"), v("1.0"));
        assert!(v("1.0") < v("1.a"));
        assert!(v("1.10") < v("1.10rc1"));
        assert!(v("5.7") < v("5.7.mysql_aurora.2.10"));
        assert!(v("2") > v("1.a"));
    }

    #[test]
    fn test_empty_version() {
        assert_eq!(v(""), v("0"));
        assert!(v("") < v("0.1"));
    }

    #[test]
    fn test_sort_key_agrees_with_comparison() {
        let versions = [
            "", "0", "0.9", "1", "1.0.0", "1.0.1", "1.2", "1.10", "1.10rc1", "1.10rc2", "1.a", "1.b", "2", "10.0.0",
            "5.7", "5.7.mysql_aurora.2.09", "5.7.mysql_aurora.2.10", "v1", "1.0.a",
        ];
        for a in versions {
            for b in versions {
                let by_key = v(a).sort_key().cmp(&v(b).sort_key());
                assert_eq!(by_key, v(a).cmp(&v(b)), "'{a}' vs '{b}'");
            }
        }
    }

    #[test]
    fn test_sort_key_with_long_numeric_runs() {
        let long = format!("1.{}", "9".repeat(10_000));
        let longer = format!("1.1{}", "0".repeat(10_000));
        assert!(v(&long) < v(&longer));
        assert!(v(&long).sort_key() < v(&longer).sort_key());
        assert!(v("1.99").sort_key() < v(&long).sort_key());
    }

    #[test]
    fn test_sort_key_equal_for_equal_versions() {
        assert_eq!(v("1.0").sort_key(), v("1.0.0").sort_key());
        assert_eq!(v("1.02").sort_key(), v("1.2").sort_key());
        assert_ne!(v("1.a").sort_key(), v("1.0").sort_key());
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(v("v1.2-rc3").to_string(), "v1.2-rc3");
        assert_eq!(v("v1.2-rc3").as_str(), "v1.2-rc3");
    }
}
