use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_files = ["./proto/alert_manager.proto"];
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    // Only the client side is needed; the alert-manager service lives elsewhere.
    tonic_build::configure()
        .out_dir(out_dir)
        .build_client(true)
        .build_server(false)
        .compile_protos(&proto_files, &["./proto"])?;

    // Tell cargo to re-run this build script if any proto file changes.
    rerun(&proto_files);

    Ok(())
}

fn rerun(proto_files: &[&str]) {
    for proto_file in proto_files {
        println!("cargo:rerun-if-changed={proto_file}");
    }
}
