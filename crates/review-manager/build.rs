use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let descriptor_path =
        PathBuf::from(std::env::var("OUT_DIR")?).join("review_descriptor.bin");

    // Determine proto file paths - check for Docker environment first, then local development
    let (proto_files, proto_includes) = if std::path::Path::new("./proto/review.proto").exists() {
        // Docker environment - proto files are in ./proto/
        (vec!["./proto/review.proto"], vec!["./proto"])
    } else {
        // Local development - proto files are in ../../proto/
        (
            vec!["../../proto/review/manager/v1/review.proto"],
            vec!["../../proto"],
        )
    };

    // Use the vendored protoc so builds do not need a system installation
    let protoc_path = protoc_bin_vendored::protoc_bin_path()
        .map_err(|e| format!("failed to locate vendored protoc: {e}"))?;
    std::env::set_var("PROTOC", protoc_path);

    tonic_build::configure()
        .protoc_arg("--experimental_allow_proto3_optional")
        .build_server(true)
        .build_client(true)
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&proto_files, &proto_includes)?;

    // Tell cargo to recompile if any .proto files change
    if std::path::Path::new("./proto/").exists() {
        println!("cargo:rerun-if-changed=./proto/");
    } else {
        println!("cargo:rerun-if-changed=../../proto/review/");
    }

    Ok(())
}
