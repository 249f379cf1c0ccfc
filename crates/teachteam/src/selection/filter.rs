use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ApplicationDisplay, Availability};

/// Search form criteria. Blank strings mean "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub tutor_name: Option<String>,
    #[serde(default, deserialize_with = "availability_or_blank")]
    pub availability: Option<Availability>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub skill_set: Option<String>,
}

impl SearchCriteria {
    /// Drops blank fields and lowercases the remaining needles once.
    pub fn normalized(&self) -> NormalizedCriteria {
        NormalizedCriteria {
            course: needle(self.course_name.as_deref()),
            candidate: needle(self.tutor_name.as_deref()),
            availability: self.availability,
            skill: needle(self.skill_set.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedCriteria {
    course: Option<String>,
    candidate: Option<String>,
    availability: Option<Availability>,
    skill: Option<String>,
}

impl NormalizedCriteria {
    pub fn is_empty(&self) -> bool {
        self.course.is_none()
            && self.candidate.is_none()
            && self.availability.is_none()
            && self.skill.is_none()
    }

    pub fn matches(&self, application: &ApplicationDisplay) -> bool {
        if let Some(course) = &self.course {
            if !contains_ci(&application.course_code, course)
                && !contains_ci(&application.course_name, course)
            {
                return false;
            }
        }

        if let Some(candidate) = &self.candidate {
            if !contains_ci(&application.candidate_name, candidate) {
                return false;
            }
        }

        if let Some(availability) = self.availability {
            if application.availability != availability {
                return false;
            }
        }

        if let Some(skill) = &self.skill {
            if !application
                .skills
                .iter()
                .any(|entry| contains_ci(entry, skill))
            {
                return false;
            }
        }

        true
    }
}

/// Lazily narrow applications to those matching every specified criterion, preserving order.
pub fn filter<'a, I>(
    applications: I,
    criteria: &SearchCriteria,
) -> impl Iterator<Item = &'a ApplicationDisplay>
where
    I: IntoIterator<Item = &'a ApplicationDisplay>,
{
    let normalized = criteria.normalized();
    applications
        .into_iter()
        .filter(move |application| normalized.matches(application))
}

pub fn filter_applications(
    applications: &[ApplicationDisplay],
    criteria: &SearchCriteria,
) -> Vec<ApplicationDisplay> {
    filter(applications, criteria).cloned().collect()
}

fn needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

// `needle` is already lowercased.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn availability_or_blank<'de, D>(deserializer: D) -> Result<Option<Availability>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = blank_as_none(deserializer)?;
    opt.map(|raw| {
        Availability::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown availability '{raw}', expected fulltime or parttime"
            ))
        })
    })
    .transpose()
}
