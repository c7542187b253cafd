use vergen::EmitBuilder;

fn main() {
    EmitBuilder::builder()
        .build_timestamp() // outputs 'VERGEN_BUILD_TIMESTAMP'
        .emit()
        .expect("Unable to generate the cargo keys!");
}
