#![no_main]

use libfuzzer_sys::fuzz_target;

use mib_expose::rpc::{PrivType, RpcFunction, RpcNamespace};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let ns = RpcNamespace::new().namespace(
        "demo",
        RpcNamespace::new().function(RpcFunction::new(
            "add",
            "demo",
            PrivType::StatusRo,
            |(a, b): (i64, i64)| Ok(a.wrapping_add(b)),
        )),
    );
    let resp = ns.handle_text(s, &|_: &str, _: PrivType| true);
    assert!(resp.get("id").is_some());
});
