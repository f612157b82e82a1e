// src/services/countries.rs

//! Country name recognition.
//!
//! Maps English country names, common aliases and ISO 3166-1 alpha-2 codes
//! to lowercase alpha-2 codes. Matching ignores case and punctuation.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::utils::slugify_with;

/// `(code, names)`; the first name is the display label.
const COUNTRIES: &[(&str, &[&str])] = &[
    ("ad", &["Andorra"]),
    ("ae", &["United Arab Emirates", "UAE"]),
    ("af", &["Afghanistan"]),
    ("ag", &["Antigua and Barbuda"]),
    ("ai", &["Anguilla"]),
    ("al", &["Albania"]),
    ("am", &["Armenia"]),
    ("ao", &["Angola"]),
    ("aq", &["Antarctica"]),
    ("ar", &["Argentina"]),
    ("as", &["American Samoa"]),
    ("at", &["Austria"]),
    ("au", &["Australia"]),
    ("aw", &["Aruba"]),
    ("ax", &["Åland Islands", "Aland Islands"]),
    ("az", &["Azerbaijan"]),
    ("ba", &["Bosnia and Herzegovina", "Bosnia"]),
    ("bb", &["Barbados"]),
    ("bd", &["Bangladesh"]),
    ("be", &["Belgium"]),
    ("bf", &["Burkina Faso"]),
    ("bg", &["Bulgaria"]),
    ("bh", &["Bahrain"]),
    ("bi", &["Burundi"]),
    ("bj", &["Benin"]),
    ("bl", &["Saint Barthélemy", "Saint Barthelemy", "St Barts"]),
    ("bm", &["Bermuda"]),
    ("bn", &["Brunei", "Brunei Darussalam"]),
    ("bo", &["Bolivia", "Plurinational State of Bolivia"]),
    ("bq", &["Bonaire, Sint Eustatius and Saba", "Caribbean Netherlands", "Bonaire"]),
    ("br", &["Brazil", "Brasil"]),
    ("bs", &["Bahamas"]),
    ("bt", &["Bhutan"]),
    ("bv", &["Bouvet Island"]),
    ("bw", &["Botswana"]),
    ("by", &["Belarus", "Byelorussia"]),
    ("bz", &["Belize"]),
    ("ca", &["Canada"]),
    ("cc", &["Cocos (Keeling) Islands", "Cocos Islands", "Keeling Islands"]),
    ("cd", &["DR Congo", "Democratic Republic of the Congo", "Congo-Kinshasa", "Zaire"]),
    ("cf", &["Central African Republic"]),
    ("cg", &["Congo", "Republic of the Congo", "Congo-Brazzaville"]),
    ("ch", &["Switzerland"]),
    ("ci", &["Cote d'Ivoire", "Côte d'Ivoire", "Ivory Coast"]),
    ("ck", &["Cook Islands"]),
    ("cl", &["Chile"]),
    ("cm", &["Cameroon"]),
    ("cn", &["China", "People's Republic of China", "PRC"]),
    ("co", &["Colombia"]),
    ("cr", &["Costa Rica"]),
    ("cu", &["Cuba"]),
    ("cv", &["Cabo Verde", "Cape Verde"]),
    ("cw", &["Curaçao", "Curacao"]),
    ("cx", &["Christmas Island"]),
    ("cy", &["Cyprus"]),
    ("cz", &["Czechia", "Czech Republic"]),
    ("de", &["Germany", "Deutschland", "Federal Republic of Germany"]),
    ("dj", &["Djibouti"]),
    ("dk", &["Denmark"]),
    ("dm", &["Dominica"]),
    ("do", &["Dominican Republic"]),
    ("dz", &["Algeria"]),
    ("ec", &["Ecuador"]),
    ("ee", &["Estonia"]),
    ("eg", &["Egypt"]),
    ("eh", &["Western Sahara"]),
    ("er", &["Eritrea"]),
    ("es", &["Spain", "España"]),
    ("et", &["Ethiopia"]),
    ("fi", &["Finland"]),
    ("fj", &["Fiji"]),
    ("fk", &["Falkland Islands", "Falkland Islands (Malvinas)", "Malvinas"]),
    ("fm", &["Micronesia", "Federated States of Micronesia"]),
    ("fo", &["Faroe Islands", "Faeroe Islands"]),
    ("fr", &["France"]),
    ("ga", &["Gabon"]),
    ("gb", &["United Kingdom", "Great Britain", "UK", "England", "Scotland", "Wales", "Northern Ireland", "United Kingdom of Great Britain and Northern Ireland"]),
    ("gd", &["Grenada"]),
    ("ge", &["Georgia"]),
    ("gf", &["French Guiana"]),
    ("gg", &["Guernsey"]),
    ("gh", &["Ghana"]),
    ("gi", &["Gibraltar"]),
    ("gl", &["Greenland"]),
    ("gm", &["Gambia"]),
    ("gn", &["Guinea"]),
    ("gp", &["Guadeloupe"]),
    ("gq", &["Equatorial Guinea"]),
    ("gr", &["Greece"]),
    ("gs", &["South Georgia and the South Sandwich Islands"]),
    ("gt", &["Guatemala"]),
    ("gu", &["Guam"]),
    ("gw", &["Guinea-Bissau"]),
    ("gy", &["Guyana"]),
    ("hk", &["Hong Kong"]),
    ("hm", &["Heard Island and McDonald Islands"]),
    ("hn", &["Honduras"]),
    ("hr", &["Croatia"]),
    ("ht", &["Haiti"]),
    ("hu", &["Hungary"]),
    ("id", &["Indonesia"]),
    ("ie", &["Ireland"]),
    ("il", &["Israel"]),
    ("im", &["Isle of Man"]),
    ("in", &["India"]),
    ("io", &["British Indian Ocean Territory"]),
    ("iq", &["Iraq"]),
    ("ir", &["Iran", "Islamic Republic of Iran", "Persia"]),
    ("is", &["Iceland"]),
    ("it", &["Italy", "Italia"]),
    ("je", &["Jersey"]),
    ("jm", &["Jamaica"]),
    ("jo", &["Jordan"]),
    ("jp", &["Japan"]),
    ("ke", &["Kenya"]),
    ("kg", &["Kyrgyzstan", "Kyrgyz Republic"]),
    ("kh", &["Cambodia"]),
    ("ki", &["Kiribati"]),
    ("km", &["Comoros"]),
    ("kn", &["Saint Kitts and Nevis"]),
    ("kp", &["North Korea", "Democratic People's Republic of Korea", "DPRK"]),
    ("kr", &["South Korea", "Republic of Korea", "Korea"]),
    ("kw", &["Kuwait"]),
    ("ky", &["Cayman Islands"]),
    ("kz", &["Kazakhstan"]),
    ("la", &["Laos", "Lao People's Democratic Republic"]),
    ("lb", &["Lebanon"]),
    ("lc", &["Saint Lucia"]),
    ("li", &["Liechtenstein"]),
    ("lk", &["Sri Lanka"]),
    ("lr", &["Liberia"]),
    ("ls", &["Lesotho"]),
    ("lt", &["Lithuania"]),
    ("lu", &["Luxembourg"]),
    ("lv", &["Latvia"]),
    ("ly", &["Libya"]),
    ("ma", &["Morocco"]),
    ("mc", &["Monaco"]),
    ("md", &["Moldova", "Republic of Moldova"]),
    ("me", &["Montenegro"]),
    ("mf", &["Saint Martin", "Saint Martin (French part)"]),
    ("mg", &["Madagascar"]),
    ("mh", &["Marshall Islands"]),
    ("mk", &["North Macedonia", "Macedonia"]),
    ("ml", &["Mali"]),
    ("mm", &["Myanmar", "Burma"]),
    ("mn", &["Mongolia"]),
    ("mo", &["Macao", "Macau"]),
    ("mp", &["Northern Mariana Islands"]),
    ("mq", &["Martinique"]),
    ("mr", &["Mauritania"]),
    ("ms", &["Montserrat"]),
    ("mt", &["Malta"]),
    ("mu", &["Mauritius"]),
    ("mv", &["Maldives"]),
    ("mw", &["Malawi"]),
    ("mx", &["Mexico"]),
    ("my", &["Malaysia"]),
    ("mz", &["Mozambique"]),
    ("na", &["Namibia"]),
    ("nc", &["New Caledonia"]),
    ("ne", &["Niger"]),
    ("nf", &["Norfolk Island"]),
    ("ng", &["Nigeria"]),
    ("ni", &["Nicaragua"]),
    ("nl", &["Netherlands", "Holland", "Kingdom of the Netherlands"]),
    ("no", &["Norway"]),
    ("np", &["Nepal"]),
    ("nr", &["Nauru"]),
    ("nu", &["Niue"]),
    ("nz", &["New Zealand"]),
    ("om", &["Oman"]),
    ("pa", &["Panama"]),
    ("pe", &["Peru"]),
    ("pf", &["French Polynesia"]),
    ("pg", &["Papua New Guinea"]),
    ("ph", &["Philippines"]),
    ("pk", &["Pakistan"]),
    ("pl", &["Poland"]),
    ("pm", &["Saint Pierre and Miquelon"]),
    ("pn", &["Pitcairn", "Pitcairn Islands"]),
    ("pr", &["Puerto Rico"]),
    ("ps", &["Palestine", "State of Palestine"]),
    ("pt", &["Portugal"]),
    ("pw", &["Palau"]),
    ("py", &["Paraguay"]),
    ("qa", &["Qatar"]),
    ("re", &["Réunion", "Reunion"]),
    ("ro", &["Romania"]),
    ("rs", &["Serbia"]),
    ("ru", &["Russia", "Russian Federation"]),
    ("rw", &["Rwanda"]),
    ("sa", &["Saudi Arabia"]),
    ("sb", &["Solomon Islands"]),
    ("sc", &["Seychelles"]),
    ("sd", &["Sudan"]),
    ("se", &["Sweden"]),
    ("sg", &["Singapore"]),
    ("sh", &["Saint Helena", "Saint Helena, Ascension and Tristan da Cunha"]),
    ("si", &["Slovenia"]),
    ("sj", &["Svalbard and Jan Mayen"]),
    ("sk", &["Slovakia", "Slovak Republic"]),
    ("sl", &["Sierra Leone"]),
    ("sm", &["San Marino"]),
    ("sn", &["Senegal"]),
    ("so", &["Somalia"]),
    ("sr", &["Suriname"]),
    ("ss", &["South Sudan"]),
    ("st", &["Sao Tome and Principe", "São Tomé and Príncipe"]),
    ("sv", &["El Salvador"]),
    ("sx", &["Sint Maarten", "Sint Maarten (Dutch part)"]),
    ("sy", &["Syria", "Syrian Arab Republic"]),
    ("sz", &["Eswatini", "Swaziland"]),
    ("tc", &["Turks and Caicos Islands"]),
    ("td", &["Chad"]),
    ("tf", &["French Southern Territories"]),
    ("tg", &["Togo"]),
    ("th", &["Thailand"]),
    ("tj", &["Tajikistan"]),
    ("tk", &["Tokelau"]),
    ("tl", &["Timor-Leste", "East Timor"]),
    ("tm", &["Turkmenistan"]),
    ("tn", &["Tunisia"]),
    ("to", &["Tonga"]),
    ("tr", &["Turkey", "Türkiye", "Turkiye"]),
    ("tt", &["Trinidad and Tobago"]),
    ("tv", &["Tuvalu"]),
    ("tw", &["Taiwan", "Taiwan, Province of China"]),
    ("tz", &["Tanzania", "United Republic of Tanzania"]),
    ("ua", &["Ukraine"]),
    ("ug", &["Uganda"]),
    ("um", &["United States Minor Outlying Islands"]),
    ("us", &["United States", "United States of America", "USA", "U.S.A."]),
    ("uy", &["Uruguay"]),
    ("uz", &["Uzbekistan"]),
    ("va", &["Holy See", "Vatican City"]),
    ("vc", &["Saint Vincent and the Grenadines"]),
    ("ve", &["Venezuela", "Bolivarian Republic of Venezuela"]),
    ("vg", &["British Virgin Islands"]),
    ("vi", &["U.S. Virgin Islands", "US Virgin Islands", "United States Virgin Islands"]),
    ("vn", &["Vietnam", "Viet Nam"]),
    ("vu", &["Vanuatu"]),
    ("wf", &["Wallis and Futuna"]),
    ("ws", &["Samoa"]),
    ("xk", &["Kosovo"]),
    ("ye", &["Yemen"]),
    ("yt", &["Mayotte"]),
    ("za", &["South Africa"]),
    ("zm", &["Zambia"]),
    ("zw", &["Zimbabwe"]),
];

/// Lookup index over the country table.
#[derive(Debug)]
pub struct CountryRegistry {
    by_name: HashMap<String, &'static str>,
    labels: HashMap<&'static str, &'static str>,
}

impl CountryRegistry {
    /// Build the index. Prefer [`CountryRegistry::shared`] outside tests.
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut labels = HashMap::new();

        for (code, names) in COUNTRIES {
            by_name.insert(code.to_string(), *code);
            for name in *names {
                if let Some(key) = Self::key(name) {
                    by_name.insert(key, *code);
                }
            }
            if let Some(label) = names.first() {
                labels.insert(*code, *label);
            }
        }

        Self { by_name, labels }
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> &'static CountryRegistry {
        static REGISTRY: OnceLock<CountryRegistry> = OnceLock::new();
        REGISTRY.get_or_init(CountryRegistry::new)
    }

    /// Resolve a country name or alpha-2 code to a lowercase code.
    ///
    /// Qualified forms such as "Korea, Republic of" or
    /// "Iran (Islamic Republic of)" are also tried with the qualifier moved
    /// to the front.
    pub fn parse(&self, text: &str) -> Option<&'static str> {
        self.lookup_key(text)
            .or_else(|| Self::unqualified(text).and_then(|t| self.lookup_key(&t)))
    }

    /// Display name for a code.
    pub fn label(&self, code: &str) -> Option<&'static str> {
        self.labels.get(code.trim().to_lowercase().as_str()).copied()
    }

    fn lookup_key(&self, text: &str) -> Option<&'static str> {
        let key = Self::key(text)?;
        self.by_name.get(&key).copied()
    }

    /// Lowercase words, punctuation dropped, leading "the" removed.
    fn key(text: &str) -> Option<String> {
        let key = slugify_with(text, " ")?;
        match key.strip_prefix("the ") {
            Some(rest) => Some(rest.to_string()),
            None => Some(key),
        }
    }

    /// "Name (Qualifier)" and "Name, Qualifier" become "Qualifier Name".
    fn unqualified(text: &str) -> Option<String> {
        let text = text.trim();
        if let Some(open) = text.find('(') {
            let close = text.rfind(')')?;
            if close < open || !text[close + 1..].trim().is_empty() {
                return None;
            }
            let (name, qualifier) = (&text[..open], &text[open + 1..close]);
            return Some(format!("{} {}", qualifier.trim(), name.trim()));
        }
        let (name, qualifier) = text.rsplit_once(',')?;
        Some(format!("{} {}", qualifier.trim(), name.trim()))
    }
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
