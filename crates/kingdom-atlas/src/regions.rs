//! Region labels of the 110m world atlas (`countries-110m.json`).

pub const WORLD_REGIONS: &[&str] = &[
    "Fiji",
    "Tanzania",
    "W. Sahara",
    "Canada",
    "United States of America",
    "Kazakhstan",
    "Uzbekistan",
    "Papua New Guinea",
    "Indonesia",
    "Argentina",
    "Chile",
    "Dem. Rep. Congo",
    "Somalia",
    "Kenya",
    "Sudan",
    "Chad",
    "Haiti",
    "Dominican Rep.",
    "Russia",
    "Bahamas",
    "Falkland Is.",
    "Norway",
    "Greenland",
    "Fr. S. Antarctic Lands",
    "Timor-Leste",
    "South Africa",
    "Lesotho",
    "Mexico",
    "Uruguay",
    "Brazil",
    "Bolivia",
    "Peru",
    "Colombia",
    "Panama",
    "Costa Rica",
    "Nicaragua",
    "Honduras",
    "El Salvador",
    "Guatemala",
    "Belize",
    "Venezuela",
    "Guyana",
    "Suriname",
    "France",
    "Ecuador",
    "Puerto Rico",
    "Jamaica",
    "Cuba",
    "Zimbabwe",
    "Botswana",
    "Namibia",
    "Senegal",
    "Mali",
    "Mauritania",
    "Benin",
    "Niger",
    "Nigeria",
    "Cameroon",
    "Togo",
    "Ghana",
    "Côte d'Ivoire",
    "Guinea",
    "Guinea-Bissau",
    "Liberia",
    "Sierra Leone",
    "Burkina Faso",
    "Central African Rep.",
    "Congo",
    "Gabon",
    "Eq. Guinea",
    "Zambia",
    "Malawi",
    "Mozambique",
    "eSwatini",
    "Angola",
    "Burundi",
    "Israel",
    "Lebanon",
    "Madagascar",
    "Palestine",
    "Gambia",
    "Tunisia",
    "Algeria",
    "Jordan",
    "United Arab Emirates",
    "Qatar",
    "Kuwait",
    "Iraq",
    "Oman",
    "Vanuatu",
    "Cambodia",
    "Thailand",
    "Laos",
    "Myanmar",
    "Vietnam",
    "North Korea",
    "South Korea",
    "Mongolia",
    "India",
    "Bangladesh",
    "Bhutan",
    "Nepal",
    "Pakistan",
    "Afghanistan",
    "Tajikistan",
    "Kyrgyzstan",
    "Turkmenistan",
    "Iran",
    "Syria",
    "Armenia",
    "Sweden",
    "Belarus",
    "Ukraine",
    "Poland",
    "Austria",
    "Hungary",
    "Moldova",
    "Romania",
    "Lithuania",
    "Latvia",
    "Estonia",
    "Germany",
    "Bulgaria",
    "Greece",
    "Turkey",
    "Albania",
    "Croatia",
    "Switzerland",
    "Luxembourg",
    "Belgium",
    "Netherlands",
    "Portugal",
    "Spain",
    "Ireland",
    "New Caledonia",
    "Solomon Is.",
    "New Zealand",
    "Australia",
    "Sri Lanka",
    "China",
    "Taiwan",
    "Italy",
    "Denmark",
    "United Kingdom",
    "Iceland",
    "Azerbaijan",
    "Georgia",
    "Philippines",
    "Malaysia",
    "Brunei",
    "Slovenia",
    "Finland",
    "Slovakia",
    "Czechia",
    "Eritrea",
    "Japan",
    "Paraguay",
    "Yemen",
    "Saudi Arabia",
    "Antarctica",
    "N. Cyprus",
    "Cyprus",
    "Morocco",
    "Egypt",
    "Libya",
    "Ethiopia",
    "Djibouti",
    "Somaliland",
    "Uganda",
    "Rwanda",
    "Bosnia and Herz.",
    "Macedonia",
    "Serbia",
    "Montenegro",
    "Kosovo",
    "Trinidad and Tobago",
    "S. Sudan",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::canonicalize;
    use std::collections::HashSet;

    #[test]
    fn labels_are_unique() {
        let set: HashSet<&str> = WORLD_REGIONS.iter().copied().collect();
        assert_eq!(set.len(), WORLD_REGIONS.len());
    }

    #[test]
    fn every_label_canonicalizes_to_something() {
        for region in WORLD_REGIONS {
            assert!(!canonicalize(region).is_empty(), "{region}");
        }
    }

    #[test]
    fn abbreviated_labels_expand() {
        assert_eq!(canonicalize("Dem. Rep. Congo"), "democratic republic of the congo");
        assert_eq!(canonicalize("S. Sudan"), "south sudan");
        assert_eq!(canonicalize("Côte d'Ivoire"), "cote divoire");
    }
}
