use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::endpoint::{ConnectionDescriptor, Endpoint, MYSQL_ENDPOINT};
use crate::error::DbaasError;

/// App environment variable carrying the JSON encoded service registry.
pub const SERVICES_ENV: &str = "TSURU_SERVICES";

/// Registry namespaces, highest priority first.
pub const DEFAULT_NAMESPACES: [&str; 3] = ["tsuru-dbaas", "tsuru-dbaas-dev", "tsuru-dbaas-qa2"];

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInstance {
    pub instance_name: String,
    #[serde(default)]
    pub envs: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub descriptors: Vec<ConnectionDescriptor>,
    /// Instances that were skipped because their endpoint could not be decoded.
    pub failures: Vec<DbaasError>,
}

pub fn default_namespaces() -> Vec<String> {
    DEFAULT_NAMESPACES.iter().map(|s| s.to_string()).collect()
}

/// Walks the service registry found in `env` and collects every database
/// endpoint, in namespace priority order.
pub fn discover(env: &HashMap<String, String>, namespaces: &[String]) -> Discovery {
    let registry = match env.get(SERVICES_ENV) {
        Some(raw) => decode_registry(raw),
        None => {
            debug!("{} is not set, no services bound", SERVICES_ENV);
            HashMap::new()
        }
    };

    let mut discovery = Discovery::default();

    for instance in instances(&registry, namespaces) {
        let Some(endpoint) = Endpoint::from_envs(&instance.envs) else {
            if instance.envs.contains_key(MYSQL_ENDPOINT) {
                warn!(
                    "Skipping mysql instance '{}': DBAAS_MYSQL_HOSTS is not set",
                    instance.instance_name
                );
            } else {
                debug!("Instance '{}' exposes no database endpoint", instance.instance_name);
            }
            continue;
        };

        match endpoint.descriptors(&instance.instance_name) {
            Ok(descriptors) => discovery.descriptors.extend(descriptors),
            Err(e) => {
                warn!("Skipping instance: {}", e);
                discovery.failures.push(e);
            }
        }
    }

    discovery
}

fn decode_registry(raw: &str) -> HashMap<String, Vec<JsonValue>> {
    match serde_json::from_str::<HashMap<String, JsonValue>>(raw) {
        Ok(registry) => registry
            .into_iter()
            .filter_map(|(namespace, value)| match value {
                JsonValue::Array(items) => Some((namespace, items)),
                _ => None,
            })
            .collect(),
        Err(e) => {
            warn!("Ignoring unparsable {}: {}", SERVICES_ENV, e);
            HashMap::new()
        }
    }
}

fn instances<'a>(
    registry: &'a HashMap<String, Vec<JsonValue>>,
    namespaces: &'a [String],
) -> impl Iterator<Item = ServiceInstance> + 'a {
    namespaces
        .iter()
        .filter_map(|namespace| registry.get(namespace))
        .flatten()
        .filter_map(|item| match ServiceInstance::deserialize(item) {
            Ok(instance) => Some(instance),
            Err(e) => {
                warn!("Ignoring undecodable service instance: {}", e);
                None
            }
        })
}
