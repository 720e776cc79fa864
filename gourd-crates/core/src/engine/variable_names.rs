use crate::containers::HashMap;
use crate::engine::variables::DomainId;

#[derive(Debug, Default, Clone)]
pub(crate) struct VariableNames {
    integers: HashMap<DomainId, String>,
}

impl VariableNames {
    pub(crate) fn get_int_name(&self, domain_id: DomainId) -> Option<&str> {
        self.integers.get(&domain_id).map(|name| name.as_str())
    }

    /// Overrides an existing name.
    pub(crate) fn add_integer(&mut self, domain_id: DomainId, name: String) {
        let _ = self.integers.insert(domain_id, name);
    }
}
