//! Grade VII geometry curriculum.
//!
//! Fixed topic table. Lessons, quizzes and lesson plans are requested for a
//! topic by name; the web client lists the table through `GET /api/curriculum`.

use serde::Serialize;

#[cfg(test)]
#[path = "curriculum_test.rs"]
mod tests;

/// School grade a topic belongs to. Only grade VII is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradeLevel {
    #[serde(rename = "VII")]
    VII,
}

impl GradeLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VII => "VII",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub grade: GradeLevel,
}

const fn vii(id: &'static str, name: &'static str) -> Topic {
    Topic { id, name, grade: GradeLevel::VII }
}

pub const CURRICULUM: &[Topic] = &[
    // ── Circle ──
    vii("vii-circle-basics", "2.1 Кружница, круг, кружен лак"),
    vii("vii-line-circle", "2.2 Заемна положба на права и кружница. Тангента"),
    vii("vii-collinear", "2.3 Колинеарни и неколинеарни точки"),
    vii("vii-segment-ops", "2.4 Графичко собирање и одземање отсечки"),
    vii("vii-parallel-perp", "2.5 Конструкција на паралелни и нормални прави"),
    vii("vii-segment-bisector", "2.6 Симетрала на отсечка"),
    vii("vii-geogebra-basic", "2.7 Основни конструкции со софтвер Геогебра"),
    // ── Angle ──
    vii("vii-angle-basics", "2.8 Основни поими за агли и полурамнини"),
    vii("vii-angle-measure", "2.9 Мерење, проценување и цртање агли"),
    vii("vii-central-angle", "2.10 Централен агол"),
    vii("vii-angle-arithmetic", "2.11 Аритметички операции со агли"),
    vii("vii-angle-graphic-ops", "2.12 Графичко собирање и одземање агли"),
    vii("vii-angle-construction-vals", "2.13 Симетрала на агол и конструкција (60°, 30°, ...)"),
    vii("vii-angle-geogebra", "2.14 Конструкција на симетрала и агли со Геогебра"),
    vii("vii-transversal", "2.15 Агли на трансверзала"),
    // ── 2D shapes ──
    vii("vii-polygons", "2.16 Конвексни и неконвексни многуаголници"),
    vii("vii-triangle-props", "2.17 Решавање проблеми од триаголник"),
    vii("vii-triangle-construct", "2.18 Конструкција на триаголник"),
    vii("vii-circumcircle", "2.19 Конструкција на опишана кружница"),
    vii("vii-incircle", "2.20 Конструкција на впишана кружница"),
    vii("vii-triangle-geogebra", "2.21 Конструкција на триаголник со Геогебра"),
    vii("vii-circles-geogebra-mobile", "2.22 Конструкција на кружници со Геогебра (мобилен)"),
    vii("vii-quadrilaterals", "2.23 Четириаголници и класификација"),
    vii("vii-parallelogram-props", "2.24 Висини и дијагонали на паралелограм"),
    vii("vii-parallelogram-problems", "2.25 Решавање проблеми со својства на паралелограм"),
    vii("vii-quad-angle-sum", "2.26 Збир на агли во четириаголник"),
    // ── Position and motion ──
    vii("vii-symmetry-translation", "2.27 Осна симетрија и транслација"),
    vii("vii-rotation", "2.28 Ротација"),
    vii("vii-trans-problems", "2.29 Проблеми со осна симетрија, транслација и ротација"),
    vii("vii-3d-projections", "2.30 Проекции на 3Д форми"),
];

/// Look a topic up by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Topic> {
    CURRICULUM.iter().find(|t| t.id == id)
}
