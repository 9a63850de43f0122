//! socket sink with the syslog codec.
//!
//! The URL scheme picks the transport: `udp://`, `tcp://`, or `tls://`
//! (tcp with TLS enabled).

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{SinkConfig, SinkContext, Tls, host_port};
use crate::spec::output::{Syslog, SyslogRfc};
use serde::Serialize;

const DEFAULT_PORT: u16 = 514;
const DEFAULT_FACILITY: &str = "user";
const DEFAULT_SEVERITY: &str = "informational";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketSink {
    pub address: String,
    pub mode: Mode,
    pub encoding: SyslogEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyslogEncoding {
    pub codec: String,
    pub rfc: String,
    pub facility: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_key: Option<String>,
    pub add_log_source: bool,
}

pub fn build(ctx: &SinkContext<'_>, settings: &Syslog) -> Vec<Element> {
    let url = ctx.url();
    let scheme = url.as_ref().map(|u| u.scheme().to_string()).unwrap_or_default();
    let mode = if scheme == "udp" { Mode::Udp } else { Mode::Tcp };
    let address = url
        .as_ref()
        .and_then(|u| host_port(u, DEFAULT_PORT))
        .unwrap_or_else(|| ctx.output.url.clone());

    let encoding = SyslogEncoding {
        codec: "syslog".to_string(),
        rfc: match settings.rfc {
            SyslogRfc::Rfc3164 => "rfc3164",
            SyslogRfc::Rfc5424 => "rfc5424",
        }
        .to_string(),
        facility: settings.facility.clone().unwrap_or_else(|| DEFAULT_FACILITY.to_string()),
        severity: settings.severity.clone().unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
        app_name: settings.app_name.clone(),
        msg_id: settings.msg_id.clone(),
        proc_id: settings.proc_id.clone(),
        tag: settings.tag.clone(),
        payload_key: settings.payload_key.clone(),
        add_log_source: settings.add_log_source,
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::Socket(SocketSink {
            address,
            mode,
            encoding,
            tls: ctx.explicit_tls(),
        }),
    )]
}
