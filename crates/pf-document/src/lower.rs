//! Document <-> model conversion.
//!
//! Lowering walks the whole document before giving up, so a caller sees
//! every bad field in one report rather than fixing them one at a time.
//! Structural findings (duplicate names, empty windows) come from the
//! network builders once all fields are well formed.

use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use pf_core::constraints::{self, COMMENT_MAX_LEN};
use pf_core::{DataObjectReference, Enumeration, FieldError, OpenEnum, PfError, Uid, Window};
use pf_network::{
    ChangeLog, ConnectedNode, ExternalConnect, FacilityIdentifier, Model, ModelBuilder, Network,
    NetworkBuilder, NetworkError, Plan, Port, PortDirection, Unit,
};

use crate::schema::{
    ChangeLogDef, ConnectedNodeDef, DataObjectReferenceDef, ExternalConnectDef,
    FacilityIdentifierDef, ModelDocument, NetworkDef, PlanDef, PortDef, UnitDef,
};
use crate::{DocumentError, DocumentResult};

/// One field-level contract violation, located by its document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFinding {
    /// e.g. `networks[0].units[1].ports[2].uid`
    pub path: String,
    pub error: FieldError,
}

impl fmt::Display for FieldFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Every field finding of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    findings: Vec<FieldFinding>,
}

impl ValidationReport {
    pub fn findings(&self) -> &[FieldFinding] {
        &self.findings
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|f| f.path.as_str())
    }

    /// The findings as path-carrying core errors.
    pub fn into_errors(self) -> Vec<PfError> {
        self.findings
            .into_iter()
            .map(|f| f.error.at(f.path))
            .collect()
    }

    fn push(&mut self, path: &str, error: FieldError) {
        self.findings.push(FieldFinding {
            path: path.to_string(),
            error,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field finding(s)", self.findings.len())?;
        for finding in &self.findings {
            write!(f, "\n  - {finding}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// `path.field`, or just `field` at the document root.
fn field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Collects findings while converting. Every method returns `None` after
/// recording a finding so callers can keep walking siblings.
#[derive(Default)]
struct Lowering {
    report: ValidationReport,
}

impl Lowering {
    fn check<T>(&mut self, path: &str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.report.push(path, error);
                None
            }
        }
    }

    fn uid(&mut self, path: &str, value: &str) -> Option<Uid> {
        self.check(&field(path, "uid"), Uid::new(value))
    }

    fn name(&mut self, path: &str, value: &str) -> Option<String> {
        self.check(path, constraints::name(value).map(str::to_string))
    }

    fn opt_name(&mut self, path: &str, value: Option<&str>) -> Option<Option<String>> {
        match value {
            None => Some(None),
            Some(v) => self.name(path, v).map(Some),
        }
    }

    fn comment(&mut self, path: &str, value: Option<&str>) -> Option<Option<String>> {
        match value {
            None => Some(None),
            Some(v) => self
                .check(
                    &field(path, "comment"),
                    constraints::max_length(v, COMMENT_MAX_LEN),
                )
                .map(|c| Some(c.to_string())),
        }
    }

    fn instant(&mut self, path: &str, value: Option<&str>) -> Option<Option<DateTime<Utc>>> {
        match value {
            None => Some(None),
            Some(v) => self.check(path, constraints::timestamp(v)).map(Some),
        }
    }

    fn window(&mut self, path: &str, start: Option<&str>, end: Option<&str>) -> Option<Window> {
        let start = self.instant(&field(path, "dtim_start"), start);
        let end = self.instant(&field(path, "dtim_end"), end);
        Some(Window::new(start?, end?))
    }

    fn open<E: Enumeration>(&mut self, path: &str, value: &str) -> Option<OpenEnum<E>> {
        self.check(path, OpenEnum::parse(value))
    }

    /// "List of 0 or 1" element.
    fn optional<'d, D, T>(
        &mut self,
        path: &str,
        values: &'d [D],
        lower: impl FnOnce(&mut Self, &str, &'d D) -> Option<T>,
    ) -> Option<Option<T>> {
        match self.check(path, constraints::at_most_one(values.iter().collect())) {
            Some(Some(value)) => lower(self, &format!("{path}[0]"), value).map(Some),
            Some(None) => Some(None),
            None => None,
        }
    }

    /// Lower every element, reporting all failures.
    fn list<'d, D, T>(
        &mut self,
        path: &str,
        values: &'d [D],
        mut lower: impl FnMut(&mut Self, &str, &'d D) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut out = Vec::with_capacity(values.len());
        let mut complete = true;
        for (i, value) in values.iter().enumerate() {
            match lower(self, &format!("{path}[{i}]"), value) {
                Some(item) => out.push(item),
                None => complete = false,
            }
        }
        complete.then_some(out)
    }

    fn facility(&mut self, path: &str, def: &FacilityIdentifierDef) -> Option<FacilityIdentifier> {
        let name = self.check(
            &format!("{path}.name"),
            constraints::required(&def.name).map(str::to_string),
        );
        let kind = match def.kind.as_deref() {
            None => Some(None),
            Some(k) => self.open(&format!("{path}.kind"), k).map(Some),
        };
        Some(FacilityIdentifier {
            name: name?,
            kind: kind?,
            naming_system: def.naming_system.clone(),
            uid_ref: def.uid_ref.clone(),
        })
    }

    fn connected_node(&mut self, path: &str, def: &ConnectedNodeDef) -> Option<ConnectedNode> {
        let uid = self.uid(path, &def.uid);
        let node = self.name(&format!("{path}.node"), &def.node);
        let window = self.window(path, def.dtim_start.as_deref(), def.dtim_end.as_deref());
        let plan_name = self.opt_name(&format!("{path}.plan_name"), def.plan_name.as_deref());
        let comment = self.comment(path, def.comment.as_deref());
        Some(ConnectedNode {
            uid: uid?,
            node: node?,
            window: window?,
            plan_name: plan_name?,
            comment: comment?,
        })
    }

    fn port(&mut self, path: &str, def: &PortDef) -> Option<Port> {
        let uid = self.uid(path, &def.uid);
        let name = self.name(&format!("{path}.name"), &def.name);
        let direction = self.check(
            &format!("{path}.direction"),
            def.direction.parse::<PortDirection>(),
        );
        let plan_name = self.opt_name(&format!("{path}.plan_name"), def.plan_name.as_deref());
        let comment = self.comment(path, def.comment.as_deref());
        let facility = self.optional(&format!("{path}.facility"), &def.facility, Self::facility);
        let products = self.list(
            &format!("{path}.expected_flow_product"),
            &def.expected_flow_product,
            |l, p, v| l.open(p, v),
        );
        let flows = self.list(
            &format!("{path}.expected_flow_property"),
            &def.expected_flow_property,
            |l, p, v| l.open(p, v),
        );
        let connections = self.list(
            &format!("{path}.connected_nodes"),
            &def.connected_nodes,
            Self::connected_node,
        );
        Some(Port {
            uid: uid?,
            name: name?,
            direction: direction?,
            exposed: def.exposed,
            plan_name: plan_name?,
            facility: facility?,
            expected_products: products?,
            expected_flows: flows?,
            comment: comment?,
            connections: connections?,
        })
    }

    fn unit(&mut self, path: &str, def: &UnitDef) -> Option<Unit> {
        let uid = self.uid(path, &def.uid);
        let name = self.name(&format!("{path}.name"), &def.name);
        let facility = self.facility(&format!("{path}.facility"), &def.facility);
        let facility_parent = self.optional(
            &format!("{path}.facility_parent"),
            &def.facility_parent,
            Self::facility,
        );
        let internal_network = self.optional(
            &format!("{path}.internal_network"),
            &def.internal_network,
            |l, p, v| l.name(p, v),
        );
        let plan_name = self.opt_name(&format!("{path}.plan_name"), def.plan_name.as_deref());
        let comment = self.comment(path, def.comment.as_deref());
        let ports = self.list(&format!("{path}.ports"), &def.ports, Self::port);
        Some(Unit {
            uid: uid?,
            name: name?,
            facility: facility?,
            facility_parent: facility_parent?,
            internal_network: internal_network?,
            plan_name: plan_name?,
            comment: comment?,
            ports: ports?,
        })
    }

    fn plan(&mut self, path: &str, def: &PlanDef) -> Option<Plan> {
        let uid = self.uid(path, &def.uid);
        let name = self.name(&format!("{path}.name"), &def.name);
        let dtim_start = self.check(
            &format!("{path}.dtim_start"),
            constraints::timestamp(&def.dtim_start),
        );
        Some(Plan {
            uid: uid?,
            name: name?,
            dtim_start: dtim_start?,
            purpose: def.purpose.clone(),
        })
    }

    fn reference(&mut self, path: &str, def: &DataObjectReferenceDef) -> Option<DataObjectReference> {
        let mut reference = self.check(
            path,
            DataObjectReference::new(def.object_type.as_str(), &def.uuid),
        )?;
        if let Some(version) = &def.version {
            reference = reference.with_version(version.as_str());
        }
        if let Some(title) = &def.title {
            reference = reference.with_title(title.as_str());
        }
        Some(reference)
    }

    fn external_connect(&mut self, path: &str, def: &ExternalConnectDef) -> Option<ExternalConnect> {
        let uid = self.uid(path, &def.uid);
        let port = self.name(&format!("{path}.port"), &def.port);
        let target_model = self.reference(&format!("{path}.target_model"), &def.target_model);
        let target_network = self.name(&format!("{path}.target_network"), &def.target_network);
        let target_port = self.name(&format!("{path}.target_port"), &def.target_port);
        Some(ExternalConnect {
            uid: uid?,
            port: port?,
            target_model: target_model?,
            target_network: target_network?,
            target_port: target_port?,
        })
    }

    fn change(&mut self, path: &str, def: &ChangeLogDef) -> Option<ChangeLog> {
        let uid = self.uid(path, &def.uid);
        let dtim = self.check(&format!("{path}.dtim"), constraints::timestamp(&def.dtim));
        let plan_name = self.opt_name(&format!("{path}.plan_name"), def.plan_name.as_deref());
        let comment = self.comment(path, def.comment.as_deref());
        Some(ChangeLog {
            uid: uid?,
            dtim: dtim?,
            reason: def.reason.clone(),
            plan_name: plan_name?,
            comment: comment?,
        })
    }

    fn network(&mut self, path: &str, def: &NetworkDef) -> Option<NetworkBuilder> {
        let uid = self.uid(path, &def.uid);
        let name = self.name(&format!("{path}.name"), &def.name);
        let parent = self.optional(
            &format!("{path}.parent_network"),
            &def.parent_network,
            |l, p, v| l.name(p, v),
        );
        let comment = self.comment(path, def.comment.as_deref());
        let units = self.list(&format!("{path}.units"), &def.units, Self::unit);
        let ports = self.list(
            &format!("{path}.external_ports"),
            &def.external_ports,
            Self::port,
        );
        let plans = self.list(&format!("{path}.plans"), &def.plans, Self::plan);
        let connects = self.list(
            &format!("{path}.external_connects"),
            &def.external_connects,
            Self::external_connect,
        );
        let changes = self.list(&format!("{path}.change_log"), &def.change_log, Self::change);

        let mut builder = NetworkBuilder::new(uid?, name?);
        if let Some(parent) = parent? {
            builder = builder.parent(parent);
        }
        if let Some(comment) = comment? {
            builder = builder.comment(comment);
        }
        for unit in units? {
            builder.add_unit(unit);
        }
        for port in ports? {
            builder.add_external_port(port);
        }
        for plan in plans? {
            builder.add_plan(plan);
        }
        for connect in connects? {
            builder.add_external_connect(connect);
        }
        for change in changes? {
            builder.add_change(change);
        }
        Some(builder)
    }

    fn model(&mut self, doc: &ModelDocument) -> Option<(ModelBuilder, Vec<NetworkBuilder>)> {
        let uuid = self.check("uuid", constraints::uuid(&doc.uuid));
        let title = self.check(
            "title",
            constraints::required(&doc.title).map(str::to_string),
        );
        let installation = self.optional("installation", &doc.installation, Self::facility);
        let validity = self.window("", doc.dtim_start.as_deref(), doc.dtim_end.as_deref());
        let comment = self.comment("", doc.comment.as_deref());
        let networks = self.list("networks", &doc.networks, Self::network);

        let mut model = ModelBuilder::new(uuid?, title?).validity(validity?);
        if let Some(version) = &doc.schema_version {
            model = model.schema_version(version.as_str());
        }
        if let Some(installation) = installation? {
            model = model.installation(installation);
        }
        if let Some(comment) = comment? {
            model = model.comment(comment);
        }
        Some((model, networks?))
    }
}

/// Convert a document into a validated model.
///
/// Field findings are reported together as `DocumentError::Validation`;
/// only a document free of them reaches the structural checks.
pub fn lower(doc: &ModelDocument) -> DocumentResult<Model> {
    let mut lowering = Lowering::default();
    let parts = lowering.model(doc);
    let (mut model, networks) = match parts {
        Some(parts) if lowering.report.is_empty() => parts,
        _ => return Err(DocumentError::Validation(lowering.report)),
    };

    let mut findings = Vec::new();
    for network in networks {
        match network.build() {
            Ok(network) => model.add_network(network),
            Err(e) => findings.extend(e.into_findings()),
        }
    }
    if !findings.is_empty() {
        return Err(NetworkError::Invalid {
            scope: format!("model '{}'", doc.title),
            findings,
        }
        .into());
    }
    Ok(model.build()?)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn raise_facility(facility: &FacilityIdentifier) -> FacilityIdentifierDef {
    FacilityIdentifierDef {
        name: facility.name.clone(),
        kind: facility.kind.as_ref().map(|k| k.to_string()),
        naming_system: facility.naming_system.clone(),
        uid_ref: facility.uid_ref.clone(),
    }
}

fn raise_port(port: &Port) -> PortDef {
    PortDef {
        uid: port.uid.to_string(),
        name: port.name.clone(),
        direction: port.direction.to_string(),
        exposed: port.exposed,
        plan_name: port.plan_name.clone(),
        comment: port.comment.clone(),
        facility: port.facility.iter().map(raise_facility).collect(),
        expected_flow_product: port.expected_products.iter().map(|p| p.to_string()).collect(),
        expected_flow_property: port.expected_flows.iter().map(|p| p.to_string()).collect(),
        connected_nodes: port
            .connections
            .iter()
            .map(|c| ConnectedNodeDef {
                uid: c.uid.to_string(),
                node: c.node.clone(),
                dtim_start: c.window.start.map(timestamp),
                dtim_end: c.window.end.map(timestamp),
                plan_name: c.plan_name.clone(),
                comment: c.comment.clone(),
            })
            .collect(),
    }
}

fn raise_network(network: &Network) -> NetworkDef {
    NetworkDef {
        uid: network.uid().to_string(),
        name: network.name().to_string(),
        parent_network: network.parent_name().map(str::to_string).into_iter().collect(),
        comment: network.comment().map(str::to_string),
        units: network
            .units()
            .iter()
            .map(|u| UnitDef {
                uid: u.uid.to_string(),
                name: u.name.clone(),
                facility: raise_facility(&u.facility),
                facility_parent: u.facility_parent.iter().map(raise_facility).collect(),
                internal_network: u.internal_network.iter().cloned().collect(),
                plan_name: u.plan_name.clone(),
                comment: u.comment.clone(),
                ports: u.ports.iter().map(raise_port).collect(),
            })
            .collect(),
        external_ports: network.external_ports().iter().map(raise_port).collect(),
        plans: network
            .plans()
            .iter()
            .map(|p| PlanDef {
                uid: p.uid.to_string(),
                name: p.name.clone(),
                dtim_start: timestamp(p.dtim_start),
                purpose: p.purpose.clone(),
            })
            .collect(),
        external_connects: network
            .external_connects()
            .iter()
            .map(|c| ExternalConnectDef {
                uid: c.uid.to_string(),
                port: c.port.clone(),
                target_model: DataObjectReferenceDef {
                    object_type: c.target_model.object_type().to_string(),
                    uuid: c.target_model.uuid().hyphenated().to_string(),
                    version: c.target_model.version().map(str::to_string),
                    title: c.target_model.title().map(str::to_string),
                },
                target_network: c.target_network.clone(),
                target_port: c.target_port.clone(),
            })
            .collect(),
        change_log: network
            .change_log()
            .iter()
            .map(|c| ChangeLogDef {
                uid: c.uid.to_string(),
                dtim: timestamp(c.dtim),
                reason: c.reason.clone(),
                plan_name: c.plan_name.clone(),
                comment: c.comment.clone(),
            })
            .collect(),
    }
}

/// Convert a model back into its document form.
pub fn raise(model: &Model) -> ModelDocument {
    ModelDocument {
        uuid: model.uuid().hyphenated().to_string(),
        title: model.title().to_string(),
        schema_version: model.schema_version().map(str::to_string),
        installation: model.installation().map(raise_facility).into_iter().collect(),
        dtim_start: model.validity().start.map(timestamp),
        dtim_end: model.validity().end.map(timestamp),
        comment: model.comment().map(str::to_string),
        networks: model.networks().iter().map(raise_network).collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::enums::ReportingFacility;

    fn port(uid: &str, name: &str, direction: &str) -> PortDef {
        PortDef {
            uid: uid.into(),
            name: name.into(),
            direction: direction.into(),
            ..Default::default()
        }
    }

    fn unit(uid: &str, name: &str, ports: Vec<PortDef>) -> UnitDef {
        UnitDef {
            uid: uid.into(),
            name: name.into(),
            facility: FacilityIdentifierDef {
                name: name.into(),
                kind: Some("separator".into()),
                ..Default::default()
            },
            ports,
            ..Default::default()
        }
    }

    fn document(units: Vec<UnitDef>) -> ModelDocument {
        ModelDocument {
            uuid: "0f7e4c5a-1b2c-4d3e-8f90-a1b2c3d4e5f6".into(),
            title: "Field".into(),
            networks: vec![NetworkDef {
                uid: "net-1".into(),
                name: "Facility".into(),
                units,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn minimal_document_lowers() {
        let doc = document(vec![unit("u1", "SeparatorA", vec![port("p1", "in1", "inlet")])]);
        let model = lower(&doc).unwrap();
        let unit = &model.network("Facility").unwrap().units()[0];
        assert_eq!(
            unit.facility.kind,
            Some(OpenEnum::Known(ReportingFacility::Separator))
        );
        assert_eq!(unit.ports[0].direction, PortDirection::Inlet);
    }

    #[test]
    fn every_bad_field_is_reported_with_its_path() {
        let mut bad_node = port("p2", "out1", "outlet");
        bad_node.connected_nodes.push(ConnectedNodeDef {
            uid: "c1".into(),
            node: "N1".into(),
            dtim_start: Some("2024-01-01".into()),
            ..Default::default()
        });
        let mut doc = document(vec![
            unit("u1", "SeparatorA", vec![port("", "in1", "inlet"), bad_node]),
            unit("u2", "Tank1", vec![port("p1", "in1", "sideways")]),
        ]);
        doc.uuid = "not-a-uuid".into();
        doc.networks[0].units[1].facility.kind = Some("silo".into());
        doc.networks[0].parent_network = vec!["A".into(), "B".into()];

        let report = match lower(&doc) {
            Err(DocumentError::Validation(report)) => report,
            other => panic!("expected validation findings, got {other:?}"),
        };
        let paths: Vec<&str> = report.paths().collect();
        assert_eq!(
            paths,
            [
                "uuid",
                "networks[0].parent_network",
                "networks[0].units[0].ports[0].uid",
                "networks[0].units[0].ports[1].connected_nodes[0].dtim_start",
                "networks[0].units[1].facility.kind",
                "networks[0].units[1].ports[0].direction",
            ]
        );
        assert_eq!(
            report.findings()[1].error,
            FieldError::TooMany { max: 1, actual: 2 }
        );
        assert_eq!(report.findings()[2].error, FieldError::Required);
        assert!(matches!(
            report.findings()[3].error,
            FieldError::PatternMismatch { .. }
        ));
        assert!(matches!(
            report.findings()[4].error,
            FieldError::InvalidEnumerationValue { enumeration: "ReportingFacility", .. }
        ));
    }

    #[test]
    fn custom_codes_pass_through_unchanged() {
        let mut p = port("p1", "in1", "inlet");
        p.expected_flow_product = vec!["acme:blend-7".into(), "c2-c4+n2".into()];
        let doc = document(vec![unit("u1", "SeparatorA", vec![p])]);
        let model = lower(&doc).unwrap();
        let raised = raise(&model);
        assert_eq!(
            raised.networks[0].units[0].ports[0].expected_flow_product,
            ["acme:blend-7", "c2-c4+n2"]
        );
    }

    #[test]
    fn structural_findings_follow_clean_fields() {
        let doc = document(vec![
            unit("u1", "Tank1", vec![port("p1", "in1", "inlet")]),
            unit("u2", "Tank1", vec![port("p1", "in1", "inlet")]),
        ]);
        match lower(&doc) {
            Err(DocumentError::Network(NetworkError::Invalid { findings, .. })) => {
                assert!(matches!(
                    findings[..],
                    [NetworkError::DuplicateName { kind: "unit", .. }]
                ));
            }
            other => panic!("expected structural findings, got {other:?}"),
        }
    }

    #[test]
    fn report_converts_to_core_errors() {
        let mut doc = document(vec![unit("u1", "Sep", vec![port("p1", "in1", "inlet")])]);
        doc.title = String::new();
        let Err(DocumentError::Validation(report)) = lower(&doc) else {
            panic!("title is required");
        };
        let errors = report.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "title: required value is missing or empty");
    }
}
