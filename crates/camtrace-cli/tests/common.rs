use std::path::PathBuf;

use tempfile::TempDir;

/// A scratch directory seeded with a small trace file, mirroring the layout
/// handlers expect: one BIP session, one TAC-bound TLS session.
pub struct TestFixture {
    pub dir: TempDir,
}

const TRACE: &str = r#"<tracedata>
  <traceitem protocol="BIP" type="envelope" year="2024" month="1" date="1" hour="10" minute="0" second="0">
    <data rawhex="00"/>
    <interpretation><interpretedresult content="Open Channel Channel: 1 Server name: tac.example.com Port: 443"/></interpretation>
  </traceitem>
  <traceitem protocol="BIP" type="envelope" year="2024" month="1" date="1" hour="10" minute="0" second="5">
    <data rawhex="00"/>
    <interpretation><interpretedresult content="Close Channel Channel: 1"/></interpretation>
  </traceitem>
</tracedata>"#;

const BAD_TRACE: &str = r#"<tracedata><traceitem protocol="BIP">"#;

impl TestFixture {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("tempdir") }
    }

    pub fn trace_file(&self) -> PathBuf {
        let path = self.dir.path().join("trace.xml");
        std::fs::write(&path, TRACE).expect("write trace");
        path
    }

    pub fn invalid_trace_file(&self) -> PathBuf {
        let path = self.dir.path().join("bad.xml");
        std::fs::write(&path, BAD_TRACE).expect("write trace");
        path
    }

    pub fn scenario_file(&self) -> PathBuf {
        let path = self.dir.path().join("scenarios.json");
        std::fs::write(
            &path,
            r#"{
                "scenarios": {
                    "tac-session": {
                        "sequence": ["TAC"],
                        "constraints": {"max_gap_enabled": false, "max_gap_seconds": 30, "max_gap_on_unknown": "warn", "max_gap_on_violation": "fail"}
                    }
                },
                "selected_scenario": "tac-session"
            }"#,
        )
        .expect("write scenarios");
        path
    }
}
