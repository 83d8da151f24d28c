use camtrace_types::{AnalysisConfig, ChannelSession, Role, Transport};

/// Resolve a session's role by the priority order: SNI match, then
/// UDP/53 (DNS), then IP-table match, else Unknown.
pub fn detect_role(session: &mut ChannelSession, sni: Option<&str>, config: &AnalysisConfig) {
    if let Some(hostname) = sni {
        if let Some(role) = config.role_for_hostname(hostname) {
            session.role = role;
            return;
        }
    }
    if session.transport == Transport::Udp && session.port == Some(53) {
        session.role = Role::Dns;
        return;
    }
    for ip in &session.ip_addresses {
        if let Some(role) = config.role_for_ip(ip) {
            session.role = role;
            return;
        }
    }
    session.role = Role::Unknown;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sni_takes_priority_over_port() {
        let mut session = ChannelSession::new(1, 0);
        session.transport = Transport::Udp;
        session.port = Some(53);
        let config = AnalysisConfig::default();
        detect_role(&mut session, Some("rsp.smdpplus.example.com"), &config);
        assert_eq!(session.role, Role::SmDpPlus);
    }

    #[test]
    fn udp_53_without_sni_is_dns() {
        let mut session = ChannelSession::new(1, 0);
        session.transport = Transport::Udp;
        session.port = Some(53);
        let config = AnalysisConfig::default();
        detect_role(&mut session, None, &config);
        assert_eq!(session.role, Role::Dns);
    }

    #[test]
    fn no_match_is_unknown() {
        let mut session = ChannelSession::new(1, 0);
        let config = AnalysisConfig::default();
        detect_role(&mut session, None, &config);
        assert_eq!(session.role, Role::Unknown);
    }
}
