use serde_json::{json, Map, Value};

/// Empty job-entry profile: names, birth date, both addresses, phones,
/// emails and a single school record.
pub(crate) fn job_entry_template() -> Map<String, Value> {
    let value = json!({
        "kanji_sei": "", "kanji_na": "",
        "kana_sei": "", "kana_na": "",
        "roma_sei": "", "roma_na": "",
        "sex": "",
        "birth": { "Y": "", "m": "", "d": "" },
        "address": {
            "current": { "postal": "", "pref": "", "city": "", "street": "", "building": "" },
            "vacation": {
                "sameAsCurrent": true,
                "postal": "", "pref": "", "city": "", "street": "", "building": "", "tel": ""
            }
        },
        "tel": { "home": "", "mobile": "" },
        "email": { "primary": "", "primaryConfirm": true, "secondary": "", "secondaryConfirm": false },
        "school": {
            "kubun": "", "kokushi": "", "initial": "",
            "dname": "", "dcd": "",
            "bname": "", "bcd": "",
            "kname": "", "paxcd": "",
            "from": { "Y": "", "m": "" },
            "to": { "Y": "", "m": "" },
            "zemi": "", "club": ""
        }
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
