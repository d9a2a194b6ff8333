#![no_main]

use gauntlet_markup::ResultsFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Lexing never fails; reading may reject the markup but must not panic
        let file = ResultsFile::new("fuzz", s);
        let _ = file.read_all();
        if let Ok(names) = file.case_names() {
            for name in names {
                let _ = file.case_text(name);
            }
        }
    }
});
