extern crate winresource;

fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").unwrap() == "windows" {
        winresource::WindowsResource::new()
            .set("ProductName", "winthumb-ctl")
            .set("FileDescription", "Thumbnail handler control tool")
            .compile()
            .unwrap();
    }
}
