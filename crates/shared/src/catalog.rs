use crate::models::CatalogSymptom;

const COMMON_SYMPTOMS: [(&str, &str, &str); 12] = [
    ("Fever", "Fever", "General"),
    ("Headache", "Headache", "Neurology"),
    ("Cough", "Cough", "Respiratory"),
    ("SoreThroat", "Sore throat", "Respiratory"),
    ("Fatigue", "Fatigue", "General"),
    ("Nausea", "Nausea", "Digestive"),
    ("Vomiting", "Vomiting", "Digestive"),
    ("Diarrhea", "Diarrhea", "Digestive"),
    ("AbdominalPain", "Abdominal pain", "Digestive"),
    ("ChestPain", "Chest pain", "Cardiology"),
    ("ShortnessOfBreath", "Shortness of breath", "Respiratory"),
    ("Dizziness", "Dizziness", "Neurology"),
];

/// Case-insensitive substring search over catalog names and ids. A blank
/// query matches nothing.
pub fn search(query: &str) -> Vec<CatalogSymptom> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    COMMON_SYMPTOMS
        .iter()
        .filter(|(id, name, _)| {
            name.to_lowercase().contains(&query) || id.to_lowercase().contains(&query)
        })
        .map(|(id, name, category)| CatalogSymptom {
            id: (*id).to_string(),
            name: (*name).to_string(),
            category: (*category).to_string(),
        })
        .collect()
}
