//! The parsed host inventory: environments, their hosts and each host's SSH
//! directives.
//!
//! ```yaml
//! prod:
//!   hosts:
//!     web1:
//!       HostName: 10.0.0.1
//!       User: admin
//!       Port: 22
//! staging:
//!   hosts:
//!     web1:
//!       HostName: 10.1.0.1
//! ```

use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    path::Path,
};

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

use crate::error::{Error, Result};

pub type Hosts = BTreeMap<String, HostProperties>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Option<BTreeMap<String, Environment>>")]
pub struct Inventory {
    environments: BTreeMap<String, Environment>,
}

impl From<Option<BTreeMap<String, Environment>>> for Inventory {
    fn from(environments: Option<BTreeMap<String, Environment>>) -> Self {
        Self {
            environments: environments.unwrap_or_default(),
        }
    }
}

impl Inventory {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::InventoryRead {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("read {} bytes of inventory from {:?}", bytes.len(), path);
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        // Merge keys are resolved on the untyped tree before the shape is checked.
        let mut value: serde_yaml_ng::Value = serde_yaml_ng::from_slice(bytes)?;
        value.apply_merge()?;
        Ok(serde_yaml_ng::from_value(value)?)
    }

    /// Environment names in ascending order.
    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    /// Hosts of `env`, or `None` if the environment does not exist or has no
    /// `hosts` key.
    pub fn hosts(&self, env: &str) -> Option<&Hosts> {
        self.environments.get(env)?.hosts()
    }

    pub fn environments(&self) -> btree_map::Iter<'_, String, Environment> {
        self.environments.iter()
    }

    /// Total number of host entries, counting a name once per environment
    /// it appears in.
    pub fn host_count(&self) -> usize {
        self.environments.values().map(Environment::host_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    hosts: Option<Hosts>,
}

// `hosts:` with a null value still counts as present.
fn present_hosts<'de, D>(deserializer: D) -> std::result::Result<Option<Hosts>, D::Error>
where
    D: Deserializer<'de>,
{
    let hosts = Option::<Hosts>::deserialize(deserializer)?;
    Ok(Some(hosts.unwrap_or_default()))
}

impl Environment {
    pub fn hosts(&self) -> Option<&Hosts> {
        self.hosts.as_ref()
    }

    /// Zero when the `hosts` key is missing.
    pub fn host_count(&self) -> usize {
        self.hosts.as_ref().map_or(0, BTreeMap::len)
    }

    /// Iterate hosts, yielding nothing when the `hosts` key is missing.
    pub fn iter_hosts(&self) -> impl Iterator<Item = (&String, &HostProperties)> {
        self.hosts.iter().flat_map(BTreeMap::iter)
    }
}

// A `null` environment (`staging:`) is an environment without hosts.
impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default, deserialize_with = "present_hosts")]
            hosts: Option<Hosts>,
        }

        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(Environment {
            hosts: raw.and_then(|r| r.hosts),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Option<BTreeMap<String, PropertyValue>>")]
pub struct HostProperties(BTreeMap<String, PropertyValue>);

impl From<Option<BTreeMap<String, PropertyValue>>> for HostProperties {
    fn from(props: Option<BTreeMap<String, PropertyValue>>) -> Self {
        Self(props.unwrap_or_default())
    }
}

impl HostProperties {
    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyValue> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a HostProperties {
    type Item = (&'a String, &'a PropertyValue);
    type IntoIter = btree_map::Iter<'a, String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single SSH directive value. Only scalars are allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Textual form with surrounding whitespace removed.
    pub fn rendered(&self) -> String {
        match self {
            PropertyValue::String(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Float(x) => write_float(f, *x),
            PropertyValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Shortest round-trip digits, switching to exponent form outside
/// `1e-4 <= |x| < 1e6` with a signed exponent of at least two digits
/// (`1e+06`, `2.5e-05`).
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("NaN");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "+Inf" } else { "-Inf" });
    }
    let sci = format!("{x:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= 6 {
        let sign = if exp < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exp.abs())
    } else {
        write!(f, "{x}")
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PropertyValueVisitor)
    }
}

struct PropertyValueVisitor;

impl<'de> Visitor<'de> for PropertyValueVisitor {
    type Value = PropertyValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(PropertyValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(PropertyValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(match i64::try_from(v) {
            Ok(v) => PropertyValue::Integer(v),
            Err(_) => PropertyValue::String(v.to_string()),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(PropertyValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(PropertyValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(PropertyValue::String(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Inventory> {
        Inventory::from_slice(yaml.as_bytes())
    }

    #[test]
    fn parses_three_levels() {
        let inv = parse(
            "prod:\n  hosts:\n    web1:\n      HostName: 10.0.0.1\n      User: admin\n      Port: 2222\n",
        )
        .unwrap();

        let web1 = &inv.hosts("prod").unwrap()["web1"];
        assert_eq!(
            web1.get("HostName"),
            Some(&PropertyValue::String("10.0.0.1".into()))
        );
        assert_eq!(web1.get("Port"), Some(&PropertyValue::Integer(2222)));
        assert_eq!(inv.host_count(), 1);
    }

    #[test]
    fn scalar_types_render_as_text() {
        let inv = parse(
            "e:\n  hosts:\n    h:\n      A: true\n      B: -3\n      C: 1.5\n      D: '  padded  '\n      E: 18446744073709551615\n",
        )
        .unwrap();
        let h = &inv.hosts("e").unwrap()["h"];
        let rendered: Vec<_> = h.iter().map(|(k, v)| (k.as_str(), v.rendered())).collect();
        assert_eq!(
            rendered,
            vec![
                ("A", "true".to_string()),
                ("B", "-3".to_string()),
                ("C", "1.5".to_string()),
                ("D", "padded".to_string()),
                ("E", "18446744073709551615".to_string()),
            ]
        );
    }

    #[test]
    fn missing_hosts_key_is_distinct_from_empty() {
        let inv = parse("staging: {}\ndev:\n  hosts: {}\nqa:\n").unwrap();
        assert!(inv.environment_names().contains(&"staging"));
        assert!(inv.hosts("staging").is_none());
        assert!(inv.hosts("qa").is_none());
        assert_eq!(inv.hosts("dev").map(BTreeMap::len), Some(0));
        assert_eq!(inv.host_count(), 0);
    }

    #[test]
    fn merge_keys_share_host_defaults() {
        let inv = parse(
            "prod:\n  hosts:\n    web1: &w {User: admin}\n    web2: {<<: *w, HostName: 10.0.0.2}\n",
        )
        .unwrap();

        let web2 = &inv.hosts("prod").unwrap()["web2"];
        assert_eq!(web2.get("User"), Some(&PropertyValue::String("admin".into())));
        assert_eq!(
            web2.get("HostName"),
            Some(&PropertyValue::String("10.0.0.2".into()))
        );
        assert!(web2.get("<<").is_none());
        assert!(parse("~\n").unwrap().is_empty());
    }

    #[test]
    fn floats_use_exponent_form_when_large_or_small() {
        let text = |x: f64| PropertyValue::Float(x).to_string();
        assert_eq!(text(1.5), "1.5");
        assert_eq!(text(123456.0), "123456");
        assert_eq!(text(0.0001), "0.0001");
        assert_eq!(text(1e6), "1e+06");
        assert_eq!(text(1e21), "1e+21");
        assert_eq!(text(1.25e-5), "1.25e-05");
        assert_eq!(text(-2.5e100), "-2.5e+100");
        assert_eq!(text(f64::INFINITY), "+Inf");
        assert_eq!(text(f64::NEG_INFINITY), "-Inf");
        assert_eq!(text(f64::NAN), "NaN");

        let inv = parse("e:\n  hosts:\n    h:\n      A: .inf\n      B: 1.0e+21\n").unwrap();
        let h = &inv.hosts("e").unwrap()["h"];
        assert_eq!(h.get("A").map(PropertyValue::rendered).as_deref(), Some("+Inf"));
        assert_eq!(h.get("B").map(PropertyValue::rendered).as_deref(), Some("1e+21"));
    }

    #[test]
    fn null_hosts_value_is_present() {
        let inv = parse("dev:\n  hosts:\n").unwrap();
        assert_eq!(inv.hosts("dev").map(BTreeMap::len), Some(0));
    }

    #[test]
    fn host_without_properties() {
        let inv = parse("dev:\n  hosts:\n    bare:\n").unwrap();
        assert!(inv.hosts("dev").unwrap()["bare"].is_empty());
    }

    #[test]
    fn environment_names_are_sorted() {
        let inv = parse("zeta: {}\nalpha: {}\nmid: {}\n").unwrap();
        assert_eq!(inv.environment_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn empty_document_is_empty_inventory() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_nested_property_values() {
        let err = parse("e:\n  hosts:\n    h:\n      LocalForward: [1, 2]\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)), "{err}");

        let err = parse("e:\n  hosts:\n    h:\n      Nested: {a: b}\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)), "{err}");
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(matches!(parse("- a\n- b\n"), Err(Error::ConfigParse(_))));
        assert!(matches!(
            parse("prod:\n  hosts: [web1]\n"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(parse("prod: [\n"), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Inventory::load(dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, Error::InventoryRead { .. }));
    }
}
