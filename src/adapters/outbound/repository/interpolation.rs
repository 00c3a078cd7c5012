use std::collections::HashMap;

/// Nested references (`${a}` → `${b}` → value) are followed this many times
const MAX_INTERPOLATION_PASSES: usize = 16;

/// Replaces `${name}` references with values from `properties`.
///
/// Unknown references are left as written so callers can report them.
pub fn interpolate(value: &str, properties: &HashMap<String, String>) -> String {
    let mut result = value.to_string();
    for _ in 0..MAX_INTERPOLATION_PASSES {
        if !result.contains("${") {
            break;
        }
        let mut out = String::with_capacity(result.len());
        let mut rest = result.as_str();
        let mut changed = false;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match properties.get(name) {
                        Some(v) => {
                            out.push_str(v);
                            changed = true;
                        }
                        None => {
                            out.push_str("${");
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        result = out;
        if !changed {
            break;
        }
    }
    result
}

/// True when `value` still holds a `${...}` reference
pub fn has_unresolved(value: &str) -> bool {
    value
        .find("${")
        .is_some_and(|start| value[start..].contains('}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_nested_references() {
        let p = props(&[
            ("quarkus.version", "${platform.version}"),
            ("platform.version", "3.8.1"),
            ("project.version", "1.0"),
        ]);
        assert_eq!(interpolate("${quarkus.version}", &p), "3.8.1");
        assert_eq!(interpolate("v${project.version}-x", &p), "v1.0-x");
    }

    #[test]
    fn test_unknown_reference_is_kept() {
        let p = props(&[("a", "1")]);
        let value = interpolate("${a}.${missing}", &p);
        assert_eq!(value, "1.${missing}");
        assert!(has_unresolved(&value));
        assert!(!has_unresolved("1.0"));
        assert!(!has_unresolved("${unterminated"));
    }

    #[test]
    fn test_self_reference_terminates() {
        let p = props(&[("loop", "${loop}")]);
        assert_eq!(interpolate("${loop}", &p), "${loop}");
    }
}
