use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::context::{ClientRequestContext, RequestHeaders};
use crate::extract::{ExtractorKey, NOT_AVAILABLE, REGISTRY};
use crate::resolve::Resolver;

/// The reported value of one attribute together with its human readable name
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AttributeResult {
    pub value: String,
    pub description: &'static str,
}

/// The complete per-request attribute mapping, in registry order
///
/// Built fresh for every request and always fully populated: extractors that
/// cannot produce a value contribute their default instead of a missing key.
pub struct InfoReport {
    entries: Vec<(ExtractorKey, AttributeResult)>,
}

impl InfoReport {
    /// Run every registered extractor against the request
    pub async fn collect<R: RequestHeaders>(
        ctx: &ClientRequestContext<'_, R>,
        resolver: &impl Resolver,
    ) -> Self {
        let mut entries = Vec::with_capacity(REGISTRY.len());

        for key in REGISTRY {
            let value = key.extract(ctx, resolver, NOT_AVAILABLE).await;

            entries.push((
                key,
                AttributeResult {
                    value,
                    description: key.description(),
                },
            ));
        }

        Self { entries }
    }

    /// Iterate the entries in registry declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ExtractorKey, &AttributeResult)> {
        self.entries.iter().map(|(key, result)| (*key, result))
    }

    /// The value reported for one key, if it is part of the report
    pub fn get(&self, key: ExtractorKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == key)
            .map(|(_, result)| result.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// serialized as a map so the registry order survives in the json output
impl Serialize for InfoReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (key, result) in &self.entries {
            map.serialize_entry(key.as_str(), result)?;
        }

        map.end()
    }
}
