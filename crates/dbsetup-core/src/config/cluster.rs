//! Cluster template and runtime version selection.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Keys of a cluster spec that dbsetup manages and compares for drift.
pub const MANAGED_CLUSTER_KEYS: &[&str] = &[
    "spark_version",
    "node_type_id",
    "driver_node_type_id",
    "autotermination_minutes",
    "autoscale",
    "spark_conf",
    "enable_elastic_disk",
    "azure_attributes",
];

/// Runtime keys containing any of these markers are not general purpose.
const EXCLUDED_RUNTIME_MARKERS: &[&str] = &["gpu", "cpu", "photon", "apache"];

/// Template used to build the spec of a managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTemplate {
    #[serde(default = "default_node_type")]
    pub node_type_id: String,

    #[serde(default = "default_node_type")]
    pub driver_node_type_id: String,

    #[serde(default = "default_autotermination_minutes")]
    pub autotermination_minutes: u32,

    #[serde(default = "default_min_workers")]
    pub min_workers: u32,

    #[serde(default = "default_max_workers")]
    pub max_workers: u32,

    #[serde(default = "default_true")]
    pub enable_elastic_disk: bool,

    /// Azure availability type for worker nodes.
    #[serde(default = "default_availability")]
    pub availability: String,

    #[serde(default = "default_first_on_demand")]
    pub first_on_demand: u32,

    /// `-1.0` bids up to the on-demand price.
    #[serde(default = "default_spot_bid_max_price")]
    pub spot_bid_max_price: f64,

    #[serde(default = "default_spark_conf")]
    pub spark_conf: BTreeMap<String, String>,
}

impl Default for ClusterTemplate {
    fn default() -> Self {
        Self {
            node_type_id: default_node_type(),
            driver_node_type_id: default_node_type(),
            autotermination_minutes: default_autotermination_minutes(),
            min_workers: default_min_workers(),
            max_workers: default_max_workers(),
            enable_elastic_disk: true,
            availability: default_availability(),
            first_on_demand: default_first_on_demand(),
            spot_bid_max_price: default_spot_bid_max_price(),
            spark_conf: default_spark_conf(),
        }
    }
}

impl ClusterTemplate {
    /// Build the create/edit payload for a cluster.
    pub fn to_spec(&self, cluster_name: &str, spark_version: &str) -> serde_json::Value {
        json!({
            "cluster_name": cluster_name,
            "spark_version": spark_version,
            "spark_conf": self.spark_conf,
            "node_type_id": self.node_type_id,
            "driver_node_type_id": self.driver_node_type_id,
            "autotermination_minutes": self.autotermination_minutes,
            "enable_elastic_disk": self.enable_elastic_disk,
            "disk_spec": {},
            "azure_attributes": {
                "first_on_demand": self.first_on_demand,
                "availability": self.availability,
                "spot_bid_max_price": self.spot_bid_max_price,
            },
            "instance_source": { "node_type_id": self.node_type_id },
            "driver_instance_source": { "node_type_id": self.driver_node_type_id },
            "autoscale": {
                "min_workers": self.min_workers,
                "max_workers": self.max_workers,
            },
        })
    }
}

/// Pick the newest general-purpose runtime from the keys a workspace offers.
///
/// Keys look like `10.4.x-scala2.12`; ordering is by numeric major/minor and
/// then by the full key.
pub fn select_runtime_version<'a, I>(keys: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter(|key| !EXCLUDED_RUNTIME_MARKERS.iter().any(|m| key.contains(m)))
        .max_by(|a, b| runtime_order(a).cmp(&runtime_order(b)).then_with(|| a.cmp(b)))
        .map(str::to_string)
}

fn runtime_order(key: &str) -> (u32, u32) {
    let mut parts = key.split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor)
}

/// Whether every value in `desired` is present and equal in `live`. Objects
/// compare as subsets; everything else compares by equality. Numbers compare
/// by value so `60` matches `60.0`.
pub fn is_subset(desired: &serde_json::Value, live: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (desired, live) {
        (Value::Object(d), Value::Object(l)) => d
            .iter()
            .all(|(k, v)| l.get(k).is_some_and(|lv| is_subset(v, lv))),
        (Value::Number(d), Value::Number(l)) => d.as_f64() == l.as_f64(),
        _ => desired == live,
    }
}

fn default_node_type() -> String {
    "Standard_DS3_v2".to_string()
}

fn default_autotermination_minutes() -> u32 {
    60
}

fn default_min_workers() -> u32 {
    1
}

fn default_max_workers() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_availability() -> String {
    "SPOT_WITH_FALLBACK_AZURE".to_string()
}

fn default_first_on_demand() -> u32 {
    1
}

fn default_spot_bid_max_price() -> f64 {
    -1.0
}

fn default_spark_conf() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "spark.databricks.delta.preview.enabled".to_string(),
        "true".to_string(),
    )])
}
