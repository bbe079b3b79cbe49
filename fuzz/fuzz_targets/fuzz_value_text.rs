#![no_main]

use libfuzzer_sys::fuzz_target;

use mib_expose::value::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // pass_persist output must be accepted as pass_persist input
    if let Ok(value) = Value::parse_typed(s) {
        let line = format!("{} {}", value.type_word(), value.format_text());
        let again = match Value::parse_typed(&line) {
            Ok(again) => again,
            Err(e) => panic!("{line:?} from {value:?} did not parse: {e}"),
        };
        // Strings are written unquoted, so surrounding blanks and quotes
        // are not preserved.
        if value.type_word() != "string" {
            assert_eq!(again, value, "{line:?}");
        }
    }
});
