#![no_main]

use libfuzzer_sys::fuzz_target;

use mib_expose::oid::OidSequence;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses must print back to an equal OID
    if let Ok(oid) = OidSequence::parse(s) {
        let again = OidSequence::parse(&oid.to_string()).expect("display output parses");
        assert_eq!(oid, again);
    }
});
