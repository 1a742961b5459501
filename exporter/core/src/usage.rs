use std::collections::BTreeMap;

/// Counts how many workloads reference each named item (an account or an authorization role).
///
/// Owned and updated by whoever walks the roles; nothing in the authorization model updates it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsageCounts(BTreeMap<String, usize>);

impl UsageCounts {
    /// Records a use of `name`, returning the updated count.
    pub fn record(&mut self, name: impl Into<String>) -> usize {
        let count = self.0.entry(name.into()).or_default();
        *count += 1;
        *count
    }

    pub fn get(&self, name: &str) -> usize {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::UsageCounts;

    #[test]
    fn counts() {
        let mut usage = UsageCounts::default();
        assert_eq!(usage.get("default"), 0);
        assert_eq!(usage.record("default"), 1);
        assert_eq!(usage.record("default"), 2);
        assert_eq!(usage.record("admin"), 1);
        assert_eq!(
            usage.iter().collect::<Vec<_>>(),
            vec![("admin", 1), ("default", 2)]
        );
    }
}
