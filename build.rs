use std::fs;

fn main() {
    // Keep the VERSION file and Cargo.toml in lockstep for releases.
    let version_file = fs::read_to_string("VERSION")
        .expect("VERSION file not found - run: echo '0.3.0' > VERSION");

    let version = version_file.trim();
    let cargo_version = env!("CARGO_PKG_VERSION");

    if version != cargo_version {
        panic!(
            "\n\n\
            ❌ VERSION MISMATCH!\n\
            VERSION file: {}\n\
            Cargo.toml:   {}\n\n\
            Update both before tagging a release.\n\n",
            version, cargo_version
        );
    }

    println!("cargo:rerun-if-changed=VERSION");
}
