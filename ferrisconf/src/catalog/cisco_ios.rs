//! Built-in Cisco IOS templates and queries.

use super::{CommandCatalog, Query, Template, TemplateStep};
use crate::platform::{Mode, SubMode};

/// Leave configuration and save, the tail of every configuration template.
fn finish(template: Template) -> Template {
    template
        .with_step(TemplateStep::ExitTo {
            mode: Mode::PrivilegedExec,
        })
        .with_step(TemplateStep::Persist)
}

fn router(command: &str) -> TemplateStep {
    TemplateStep::EnterSubmode {
        kind: SubMode::Router,
        command: command.to_string(),
    }
}

/// Create the Cisco IOS catalog.
///
/// | Template   | Parameters                                   |
/// |------------|----------------------------------------------|
/// | `hostname` | `hostname`                                   |
/// | `loopback` | `loopback_id`, `address`, `mask`             |
/// | `ospf`     | `process_id`, `network`, `wildcard`, `area`  |
/// | `eigrp`    | `asn`, `network`, `wildcard`                 |
/// | `rip`      | `version`, `network`                         |
pub fn catalog() -> CommandCatalog {
    let hostname = Template::new("hostname")
        .with_step(TemplateStep::EnterConfig)
        .with_step(TemplateStep::global("hostname {hostname}"))
        .with_step(TemplateStep::ConfirmHostname {
            hostname: "{hostname}".to_string(),
        });

    let loopback = Template::new("loopback")
        .with_step(TemplateStep::EnterConfig)
        .with_step(TemplateStep::EnterSubmode {
            kind: SubMode::Interface,
            command: "interface loopback {loopback_id}".to_string(),
        })
        .with_step(TemplateStep::sub(
            SubMode::Interface,
            "ip address {address} {mask}",
        ));

    let ospf = Template::new("ospf")
        .with_step(TemplateStep::EnterConfig)
        .with_step(router("router ospf {process_id}"))
        .with_step(TemplateStep::sub(
            SubMode::Router,
            "network {network} {wildcard} area {area}",
        ));

    let eigrp = Template::new("eigrp")
        .with_step(TemplateStep::EnterConfig)
        .with_step(router("router eigrp {asn}"))
        .with_step(TemplateStep::sub(
            SubMode::Router,
            "network {network} {wildcard}",
        ));

    let rip = Template::new("rip")
        .with_step(TemplateStep::EnterConfig)
        .with_step(router("router rip"))
        .with_step(TemplateStep::sub(SubMode::Router, "version {version}"))
        .with_step(TemplateStep::sub(SubMode::Router, "network {network}"));

    CommandCatalog::new()
        .with_template(finish(hostname))
        .with_template(finish(loopback))
        .with_template(finish(ospf))
        .with_template(finish(eigrp))
        .with_template(finish(rip))
        .with_query(Query::new("interface_brief", "show ip interface brief"))
        .with_query(Query::new("running_config", "show running-config"))
        .with_query(Query::new("startup_config", "show startup-config"))
        .with_query(Query::new("ospf_config", "show running-config | section ospf"))
        .with_query(Query::new("eigrp_config", "show running-config | section eigrp"))
        .with_query(Query::new("rip_config", "show running-config | include router rip"))
}
