use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::domain::UserRole;

pub const ENTRY_PATH: &str = "/auth";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RouteName {
    Root,
    Auth,
    UserDashboard,
    UserQuizzes,
    UserScores,
    UserProfile,
    QuizAttempt,
    QuizResults,
    AdminDashboard,
    AdminSubjects,
    AdminChapters,
    AdminQuizzes,
    AdminQuestions,
    AdminUsers,
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteRequirement {
    pub requires_auth: bool,
    pub role: Option<UserRole>,
}

impl RouteRequirement {
    pub const PUBLIC: RouteRequirement = RouteRequirement {
        requires_auth: false,
        role: None,
    };

    pub const fn role(role: UserRole) -> Self {
        RouteRequirement {
            requires_auth: true,
            role: Some(role),
        }
    }
}

pub struct RouteDefinition {
    pub name: RouteName,
    pub pattern: &'static str,
    pub requirement: RouteRequirement,
    /// Static redirect applied before any guard runs.
    pub redirect: Option<&'static str>,
    matcher: Regex,
}

impl RouteDefinition {
    fn new(name: RouteName, pattern: &'static str, requirement: RouteRequirement) -> Self {
        RouteDefinition {
            name,
            pattern,
            requirement,
            redirect: None,
            matcher: compile(pattern),
        }
    }

    fn redirecting(name: RouteName, pattern: &'static str, target: &'static str) -> Self {
        RouteDefinition {
            redirect: Some(target),
            ..RouteDefinition::new(name, pattern, RouteRequirement::PUBLIC)
        }
    }

    pub fn is_entry(&self) -> bool {
        self.name == RouteName::Auth
    }
}

/// `/user/quiz/:id` becomes `^/user/quiz/(?P<id>[^/]+)$`.
fn compile(pattern: &str) -> Regex {
    let body: Vec<String> = pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => format!("(?P<{}>[^/]+)", param),
            None => regex::escape(segment),
        })
        .collect();

    Regex::new(&format!("^{}$", body.join("/"))).expect("route patterns are valid regexes")
}

static ROUTES: Lazy<Vec<RouteDefinition>> = Lazy::new(|| {
    use RouteName::*;
    let user = RouteRequirement::role(UserRole::User);
    let admin = RouteRequirement::role(UserRole::Admin);

    vec![
        RouteDefinition::redirecting(Root, "/", ENTRY_PATH),
        RouteDefinition::new(Auth, ENTRY_PATH, RouteRequirement::PUBLIC),
        RouteDefinition::new(UserDashboard, "/user/dashboard", user),
        RouteDefinition::new(UserQuizzes, "/user/quizzes", user),
        RouteDefinition::new(UserScores, "/user/scores", user),
        RouteDefinition::new(UserProfile, "/user/profile", user),
        RouteDefinition::new(QuizAttempt, "/user/quiz/:id", user),
        RouteDefinition::new(QuizResults, "/user/quiz/:id/results", user),
        RouteDefinition::new(AdminDashboard, "/admin/dashboard", admin),
        RouteDefinition::new(AdminSubjects, "/admin/subjects", admin),
        RouteDefinition::new(AdminChapters, "/admin/chapters", admin),
        RouteDefinition::new(AdminQuizzes, "/admin/quizzes", admin),
        RouteDefinition::new(AdminQuestions, "/admin/quiz/:id/questions", admin),
        RouteDefinition::new(AdminUsers, "/admin/users", admin),
    ]
});

static NOT_FOUND: Lazy<RouteDefinition> =
    Lazy::new(|| RouteDefinition::new(RouteName::NotFound, "/*", RouteRequirement::PUBLIC));

pub fn definition(name: RouteName) -> &'static RouteDefinition {
    ROUTES
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| Lazy::force(&NOT_FOUND))
}

/// A path matched against the route table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub name: RouteName,
    pub path: String,
    pub params: HashMap<String, String>,
}

impl Location {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn definition(&self) -> &'static RouteDefinition {
        definition(self.name)
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Resolves a path to its route; unknown paths land on `NotFound`.
pub fn resolve(path: &str) -> Location {
    let path = normalize(path);

    for route in ROUTES.iter() {
        if let Some(captures) = route.matcher.captures(&path) {
            let params = route
                .matcher
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect();

            return Location {
                name: route.name,
                path,
                params,
            };
        }
    }

    Location {
        name: RouteName::NotFound,
        path,
        params: HashMap::new(),
    }
}
