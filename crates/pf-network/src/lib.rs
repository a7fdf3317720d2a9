//! pf-network: product flow network layer.
//!
//! Provides:
//! - Network object model (Model, Network, Unit, Port, ConnectedNode, Plan)
//! - Incremental builders with structural validation
//! - Network hierarchy walks with cycle detection
//! - Plan overlay views
//! - Local and cross-document reference resolution
//! - Node materialization and mass-balance support
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use pf_core::enums::ReportingFacility;
//! use pf_core::{Uid, Window};
//! use pf_network::{
//!     ConnectedNode, FacilityIdentifier, ModelBuilder, NetworkBuilder, PlanSelector, Port,
//!     PortDirection, Unit, nodes,
//! };
//! use uuid::Uuid;
//!
//! let uid = |s: &str| Uid::new(s).unwrap();
//! let mut net = NetworkBuilder::new(uid("n1"), "Facility");
//! let sep = net.add_unit(Unit::new(
//!     uid("u1"),
//!     "SeparatorA",
//!     FacilityIdentifier::new("SeparatorA", ReportingFacility::Separator),
//! ));
//! let tank = net.add_unit(Unit::new(
//!     uid("u2"),
//!     "Tank1",
//!     FacilityIdentifier::new("Tank1", ReportingFacility::Tank),
//! ));
//! let out1 = net.add_port(sep, Port::new(uid("p1"), "out1", PortDirection::Outlet)).unwrap();
//! let in1 = net.add_port(tank, Port::new(uid("p1"), "in1", PortDirection::Inlet)).unwrap();
//! net.connect(out1, ConnectedNode::new(uid("c1"), "N1", Window::always())).unwrap();
//! net.connect(in1, ConnectedNode::new(uid("c1"), "N1", Window::always())).unwrap();
//!
//! let model = ModelBuilder::new(Uuid::new_v4(), "Field")
//!     .network(net.build().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
//! let facility = model.network("Facility").unwrap();
//! let partition = nodes::materialize(&model, facility, &PlanSelector::Actual, at).unwrap();
//! assert_eq!(partition.group("N1").unwrap().members.len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod nodes;
pub mod plan;
pub mod resolve;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::{ModelBuilder, NetworkBuilder};
pub use error::{NetworkError, NetworkResult, PortContractMismatch};
pub use model::{
    ChangeLog, ConnectedNode, ExternalConnect, FacilityIdentifier, Model, Network, Plan, Port,
    PortAddress, PortDirection, PortOwner, Unit,
};
pub use nodes::{MassBalance, NodeGroup, NodeMember, NodePartition, NodeSide, PressureCheck};
pub use plan::{NetworkView, PlanSelector, PortView, UnitView};
pub use resolve::{ContractReport, ExternalTarget, LocalTarget, ModelLookup};
