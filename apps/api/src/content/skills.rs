use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// 0-100
    pub proficiency: u8,
    pub category: String,
}

/// The portfolio owner's skills, used by the skills section and the
/// suitability tool.
#[derive(Debug, Clone, Serialize)]
pub struct SkillProfile {
    skills: Vec<Skill>,
}

impl SkillProfile {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Case-insensitive lookup.
    pub fn proficiency(&self, name: &str) -> Option<u8> {
        let wanted = name.trim().to_lowercase();
        self.skills
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
            .map(|s| s.proficiency)
    }
}

impl Default for SkillProfile {
    fn default() -> Self {
        let skill = |name: &str, proficiency: u8, category: &str| Skill {
            name: name.to_string(),
            proficiency,
            category: category.to_string(),
        };
        Self::new(vec![
            skill("Python", 90, "Languages"),
            skill("SQL", 95, "Languages"),
            skill("Scala", 70, "Languages"),
            skill("Apache Spark", 85, "Data Processing"),
            skill("Kafka", 75, "Data Processing"),
            skill("Airflow", 85, "Orchestration"),
            skill("dbt", 80, "Transformation"),
            skill("Snowflake", 85, "Warehousing"),
            skill("BigQuery", 75, "Warehousing"),
            skill("AWS", 80, "Cloud"),
            skill("Docker", 75, "Infrastructure"),
            skill("Kubernetes", 60, "Infrastructure"),
            skill("Terraform", 65, "Infrastructure"),
            skill("Tableau", 70, "Analytics"),
            skill("Machine Learning", 70, "Analytics"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let profile = SkillProfile::default();
        assert_eq!(profile.proficiency("python"), Some(90));
        assert_eq!(profile.proficiency(" SQL "), Some(95));
        assert_eq!(profile.proficiency("Rust"), None);
    }
}
