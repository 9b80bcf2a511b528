fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Client and server stubs for the rating model (the server half is used by tests)
    tonic_build::compile_protos("../../proto/ratings.proto")?;
    Ok(())
}
