fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::configure()
        .type_attribute(".", "#[derive(serde::Serialize, serde::Deserialize)]")
        .compile_protos(&["proto/ingest.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/ingest.proto");

    Ok(())
}
