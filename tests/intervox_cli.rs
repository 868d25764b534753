use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn intervox_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_intervox").expect("intervox test binary not built")
}

#[test]
fn help_mentions_the_session_runner() {
    let output = Command::new(intervox_bin())
        .arg("--help")
        .output()
        .expect("run intervox --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("intervox"));
    assert!(combined.contains("--volume-threshold"));
}

#[test]
fn list_input_devices_prints_a_message_on_any_host() {
    let output = Command::new(intervox_bin())
        .arg("--list-input-devices")
        .output()
        .expect("run intervox --list-input-devices");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(
        combined.contains("audio input devices")
            || combined.contains("Failed to list audio input devices")
    );
}

#[test]
fn invalid_thresholds_are_rejected_before_startup() {
    let output = Command::new(intervox_bin())
        .args(["--volume-threshold", "400"])
        .output()
        .expect("run intervox with a bad threshold");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--volume-threshold"));
}
