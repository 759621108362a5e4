//! The v1 core API collections.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::HttpClient;
use crate::query::SortParam;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Clients,
    Contacts,
    Contracts,
    HardwareAssets,
    Members,
    Saas,
    Tickets,
    Opportunities,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Clients,
        ResourceKind::Contacts,
        ResourceKind::Contracts,
        ResourceKind::HardwareAssets,
        ResourceKind::Members,
        ResourceKind::Saas,
        ResourceKind::Tickets,
        ResourceKind::Opportunities,
    ];

    pub fn base_path(self) -> &'static str {
        match self {
            ResourceKind::Clients => "/core/v1/clients",
            ResourceKind::Contacts => "/core/v1/contacts",
            ResourceKind::Contracts => "/core/v1/contracts",
            ResourceKind::HardwareAssets => "/core/v1/assets/hardware",
            ResourceKind::Members => "/core/v1/members",
            ResourceKind::Saas => "/core/v1/saas",
            ResourceKind::Tickets => "/core/v1/tickets",
            ResourceKind::Opportunities => "/core/v1/opportunities",
        }
    }

    pub fn sort_param(self) -> SortParam {
        SortParam::Sort
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Clients => "clients",
            ResourceKind::Contacts => "contacts",
            ResourceKind::Contracts => "contracts",
            ResourceKind::HardwareAssets => "hardware-assets",
            ResourceKind::Members => "members",
            ResourceKind::Saas => "saas",
            ResourceKind::Tickets => "tickets",
            ResourceKind::Opportunities => "opportunities",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry point for `/core/...`.
#[derive(Debug, Clone)]
pub struct Core {
    http: Arc<HttpClient>,
}

impl Core {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub fn v1(&self) -> CoreV1 {
        CoreV1 {
            http: Arc::clone(&self.http),
        }
    }
}

/// The `/core/v1` collections. Items are raw JSON unless a typed resource is
/// requested with [`CoreV1::typed`].
#[derive(Debug, Clone)]
pub struct CoreV1 {
    http: Arc<HttpClient>,
}

impl CoreV1 {
    pub fn resource(&self, kind: ResourceKind) -> Resource<Value> {
        self.typed(kind)
    }

    pub fn typed<T: DeserializeOwned + Send + 'static>(&self, kind: ResourceKind) -> Resource<T> {
        Resource::new(Arc::clone(&self.http), kind.base_path(), kind.sort_param())
    }

    pub fn clients(&self) -> Resource<Value> {
        self.resource(ResourceKind::Clients)
    }

    pub fn contacts(&self) -> Resource<Value> {
        self.resource(ResourceKind::Contacts)
    }

    pub fn contracts(&self) -> Resource<Value> {
        self.resource(ResourceKind::Contracts)
    }

    pub fn hardware_assets(&self) -> Resource<Value> {
        self.resource(ResourceKind::HardwareAssets)
    }

    pub fn members(&self) -> Resource<Value> {
        self.resource(ResourceKind::Members)
    }

    pub fn saas(&self) -> Resource<Value> {
        self.resource(ResourceKind::Saas)
    }

    pub fn tickets(&self) -> Resource<Value> {
        self.resource(ResourceKind::Tickets)
    }

    pub fn opportunities(&self) -> Resource<Value> {
        self.resource(ResourceKind::Opportunities)
    }
}
