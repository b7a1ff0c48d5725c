// src/lexicon.rs - immutable alias tables driving entity extraction

use serde::Deserialize;
use std::collections::BTreeMap;

/// One specialty root word. Roots ending in "logy" also carry their stem so
/// the suffix heuristics can recognize truncated and misspelled forms.
#[derive(Debug, Clone)]
pub struct SpecialtyEntry {
    pub category: String,
    pub stem: Option<String>,
}

/// The three alias namespaces used by the token matcher: medical entity types,
/// departments, and specialty roots. Built once, passed around by reference
/// (or `Arc`), and never mutated. Categories with empty alias sets simply
/// never match.
#[derive(Debug, Clone)]
pub struct Lexicon {
    medical_entities: BTreeMap<String, Vec<String>>,
    departments: BTreeMap<String, Vec<String>>,
    specialty_roots: Vec<String>,
    specialty_entries: Vec<SpecialtyEntry>,
}

/// Serde-facing shape of the lexicon tables, for loading from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconTables {
    pub medical_entities: BTreeMap<String, Vec<String>>,
    pub departments: BTreeMap<String, Vec<String>>,
    pub specialty_roots: Vec<String>,
}

impl Lexicon {
    pub fn new(
        medical_entities: BTreeMap<String, Vec<String>>,
        departments: BTreeMap<String, Vec<String>>,
        specialty_roots: Vec<String>,
    ) -> Self {
        let lower_map = |map: BTreeMap<String, Vec<String>>| -> BTreeMap<String, Vec<String>> {
            map.into_iter()
                .map(|(category, aliases)| {
                    (
                        category.to_lowercase(),
                        aliases
                            .into_iter()
                            .map(|a| a.trim().to_lowercase())
                            .filter(|a| !a.is_empty())
                            .collect(),
                    )
                })
                .collect()
        };

        let specialty_roots: Vec<String> = specialty_roots
            .into_iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();

        let specialty_entries = specialty_roots
            .iter()
            .map(|root| SpecialtyEntry {
                category: root.clone(),
                stem: root.strip_suffix("logy").map(|s| s.to_string()),
            })
            .collect();

        Self {
            medical_entities: lower_map(medical_entities),
            departments: lower_map(departments),
            specialty_roots,
            specialty_entries,
        }
    }

    pub fn from_tables(tables: LexiconTables) -> Self {
        Self::new(tables.medical_entities, tables.departments, tables.specialty_roots)
    }

    pub fn medical_entities(&self) -> &BTreeMap<String, Vec<String>> {
        &self.medical_entities
    }

    pub fn departments(&self) -> &BTreeMap<String, Vec<String>> {
        &self.departments
    }

    pub fn specialty_roots(&self) -> &[String] {
        &self.specialty_roots
    }

    pub fn specialty_entries(&self) -> &[SpecialtyEntry] {
        &self.specialty_entries
    }

    /// The production alias tables for healthcare organization names.
    pub fn builtin() -> Self {
        let mut medical = BTreeMap::new();
        medical.insert(
            "medical center".to_string(),
            str_vec(&[
                "medical center",
                "medicalcenter",
                "medical ctr",
                "medical ce",
                "med center",
                "medical c",
                "mc",
                "medical cnt",
                "medical ct",
                "regional medical",
            ]),
        );
        medical.insert(
            "medical association".to_string(),
            str_vec(&[
                "medical association",
                "association",
                "assoc",
                "assc",
                "medical a",
                "medical assoc",
                "medical associ",
                "med assoc",
                "med association",
                "medical associates",
                "medical associate",
            ]),
        );
        medical.insert(
            "medical group".to_string(),
            str_vec(&["medical group", "medical grp", "med group", "medic group"]),
        );
        medical.insert(
            "medical foundation".to_string(),
            str_vec(&[
                "medical foundation",
                "med found",
                "medical found",
                "medica fnd",
                "foundation",
            ]),
        );
        medical.insert(
            "health system".to_string(),
            str_vec(&["health sys", "health system", "health syst", "health crna"]),
        );
        medical.insert(
            "medical complex".to_string(),
            str_vec(&[
                "medical complex",
                "medical comp",
                "medical corp",
                "medical complx",
                "medica complex",
            ]),
        );

        let mut departments = BTreeMap::new();
        departments.insert(
            "pharmacy".to_string(),
            str_vec(&["pharm", "pha", "pharma", "pharmac", "phcy", "pharmacies", "phy"]),
        );
        departments.insert(
            "ambulatory surgery center".to_string(),
            str_vec(&[
                "ambulatory surgery center",
                "ambulatory surgery",
                "ambulatory surgical center",
                "surgery center",
                "surgery c",
                "ambulatory",
                "surgical center",
                "surgical services",
            ]),
        );
        departments.insert(
            "emergency room".to_string(),
            str_vec(&[
                "emrgncy",
                "emr",
                "emerg",
                "emergency",
                "ems",
                "emer",
                "emergency department",
                "emegency",
            ]),
        );
        departments.insert("outpatient".to_string(), str_vec(&["out patient", "outpatient"]));
        departments.insert("inpatient".to_string(), str_vec(&["in patient", "inpatient"]));
        departments.insert("rehabilitation".to_string(), str_vec(&["rehab", "rehabilitation"]));
        departments.insert(
            "neurosurgery".to_string(),
            str_vec(&["neuro surgery", "neurosurgery"]),
        );
        departments.insert("trauma".to_string(), str_vec(&["traumatic"]));
        departments.insert("dialysis".to_string(), str_vec(&["dialys", "dialysis"]));
        departments.insert("physicians".to_string(), str_vec(&["physicians", "physician"]));
        departments.insert(
            "specialists".to_string(),
            str_vec(&["specialists", "specialist", "specalist"]),
        );
        departments.insert(
            "fitness center".to_string(),
            str_vec(&["fitness", "fitness c", "fitness cntr"]),
        );
        departments.insert(
            "urgent care".to_string(),
            str_vec(&["urgent", "urg care", "urgent care"]),
        );
        departments.insert(
            "intensive care unit".to_string(),
            str_vec(&["intensive care unit", "icu"]),
        );
        departments.insert(
            "sleep center".to_string(),
            str_vec(&[
                "sleep center",
                "sleep cent",
                "slee cneter",
                "sleep cneter",
                "sleep lab",
                "sleep clinic",
            ]),
        );
        departments.insert(
            "physical therapy".to_string(),
            str_vec(&["physical therapy", "physical thera", "physcal ther"]),
        );
        departments.insert(
            "labor".to_string(),
            str_vec(&["labor and delivery", "labor and deliv"]),
        );
        departments.insert(
            "social work".to_string(),
            str_vec(&["social work", "soc work", "socia work"]),
        );
        departments.insert(
            "behavioral health".to_string(),
            str_vec(&["behavioral health", "behave health"]),
        );
        departments.insert(
            "home health".to_string(),
            str_vec(&["home health", "home hlth", "hom health"]),
        );
        departments.insert(
            "speech pathology".to_string(),
            str_vec(&["speech patho", "speech patholog", "sleep patholo"]),
        );
        departments.insert(
            "imaging center".to_string(),
            str_vec(&["imaging center", "imaging", "imaging c", "imaging cent"]),
        );
        departments.insert(
            "wellness center".to_string(),
            str_vec(&[
                "wellness center",
                "wellness cent",
                "wellness c",
                "wellness cente",
                "well center",
            ]),
        );
        departments.insert(
            "respiratory therapy".to_string(),
            str_vec(&[
                "respiratory therap",
                "resp therapy",
                "respiratory ther",
                "resp ther",
            ]),
        );
        departments.insert(
            "infectious diseases".to_string(),
            str_vec(&[
                "infectious diseas",
                "infect diseases",
                "infect disease",
            ]),
        );
        departments.insert(
            "imaging services".to_string(),
            str_vec(&["imaging services", "imaging servi", "imagi services"]),
        );

        let specialty_roots = str_vec(&[
            "pathology",
            "ophthalmology",
            "gastroenterology",
            "dermatology",
            "neonatology",
            "cardiology",
            "hematology",
            "audiology",
            "endocrinology",
            "oncology",
            "gynecology",
            "urology",
            "nephrology",
            "radiology",
            "anesthesiology",
            "pulmonology",
            "neurology",
            "psychology",
            "immunology",
            "rheumatology",
            "perinatology",
            "obgyn",
            "orthopedic",
            "pediatric",
            "geriatric",
            "endoscopy",
            "otorhinolaryngology",
            "hospice",
            "mammography",
            "hepatology",
            "otolaryngology",
            "pulmonary",
            "psychiatry",
        ]);

        Self::new(medical, departments, specialty_roots)
    }
}

fn str_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_present() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.medical_entities().contains_key("medical center"));
        assert!(lexicon.departments().contains_key("emergency room"));
        assert!(lexicon.specialty_roots().contains(&"urology".to_string()));
    }

    #[test]
    fn test_specialty_stems_only_for_logy_roots() {
        let lexicon = Lexicon::builtin();
        let cardiology = lexicon
            .specialty_entries()
            .iter()
            .find(|e| e.category == "cardiology")
            .unwrap();
        assert_eq!(cardiology.stem.as_deref(), Some("cardio"));

        let obgyn = lexicon
            .specialty_entries()
            .iter()
            .find(|e| e.category == "obgyn")
            .unwrap();
        assert!(obgyn.stem.is_none());
    }

    #[test]
    fn test_new_lowercases_and_drops_empty_aliases() {
        let mut departments = BTreeMap::new();
        departments.insert("Pharmacy".to_string(), vec!["PHARM".to_string(), "  ".to_string()]);
        let lexicon = Lexicon::new(BTreeMap::new(), departments, vec!["Urology".to_string()]);
        assert_eq!(
            lexicon.departments().get("pharmacy").unwrap(),
            &vec!["pharm".to_string()]
        );
        assert_eq!(lexicon.specialty_roots(), &["urology".to_string()]);
    }
}
