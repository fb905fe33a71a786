//! Step-text string table: the core never hard-codes a step title or
//! description inline so callers can pin language-neutral wording in
//! tests, or swap in a translated table without touching strategy logic.

#[derive(Debug, Clone)]
pub struct Locale {
    pub quadratic_discriminant_title: String,
    pub quadratic_discriminant_description: String,
    pub quadratic_roots_title: String,
    pub quadratic_roots_real_description: String,
    pub quadratic_roots_double_description: String,
    pub quadratic_roots_complex_description: String,
    pub differentiate_title: String,
    pub differentiate_description: String,
    pub integrate_title: String,
    pub integrate_description: String,
    pub integrate_unresolved_description: String,
    pub limit_title: String,
    pub limit_description: String,
    pub limit_divergent_description: String,
    pub simplify_title: String,
    pub simplify_description: String,
    pub expand_title: String,
    pub expand_description: String,
    pub factor_title: String,
    pub factor_description: String,
    pub matrix_title: String,
    pub matrix_description: String,
    pub fallback_title: String,
    pub fallback_description: String,
    pub result_title: String,
    pub result_description: String,
    pub manipulation_before_title: String,
    pub manipulation_before_description: String,
    pub follow_up_differentiate_label: String,
    pub follow_up_differentiate_description: String,
    pub follow_up_integrate_label: String,
    pub follow_up_integrate_description: String,
    pub follow_up_simplify_label: String,
    pub follow_up_simplify_description: String,
}

impl Locale {
    /// English, stable wording. What the test suite pins against.
    pub fn neutral() -> Self {
        Self {
            quadratic_discriminant_title: "Compute the discriminant".to_string(),
            quadratic_discriminant_description: "b^2 - 4ac determines the number and nature of the roots"
                .to_string(),
            quadratic_roots_title: "Solve for the roots".to_string(),
            quadratic_roots_real_description: "Two distinct real roots".to_string(),
            quadratic_roots_double_description: "One repeated real root".to_string(),
            quadratic_roots_complex_description: "Two complex conjugate roots".to_string(),
            differentiate_title: "Differentiate".to_string(),
            differentiate_description: "Apply the elementary differentiation rules".to_string(),
            integrate_title: "Integrate".to_string(),
            integrate_description: "Match an antiderivative rule and add the constant of integration".to_string(),
            integrate_unresolved_description: "No rule in the table matched this integrand".to_string(),
            limit_title: "Evaluate the limit".to_string(),
            limit_description: "Sample the expression from both sides of the target".to_string(),
            limit_divergent_description: "The samples did not converge within tolerance".to_string(),
            simplify_title: "Simplify".to_string(),
            simplify_description: "Fold constants, collect like terms, and reduce fractions".to_string(),
            expand_title: "Expand".to_string(),
            expand_description: "Distribute multiplication over addition".to_string(),
            factor_title: "Factor".to_string(),
            factor_description: "Recover integer roots of a quadratic".to_string(),
            matrix_title: "Matrix operation".to_string(),
            matrix_description: "Apply the requested linear-algebra kernel".to_string(),
            fallback_title: "Simplified form".to_string(),
            fallback_description: "No specialized strategy matched; showing the simplified expression".to_string(),
            result_title: "Result".to_string(),
            result_description: "The resulting expression after applying the rule above".to_string(),
            manipulation_before_title: "Original expression".to_string(),
            manipulation_before_description: "The expression as written, before manipulation".to_string(),
            follow_up_differentiate_label: "Differentiate".to_string(),
            follow_up_differentiate_description: "Take the derivative of this expression".to_string(),
            follow_up_integrate_label: "Integrate".to_string(),
            follow_up_integrate_description: "Find an antiderivative of this expression".to_string(),
            follow_up_simplify_label: "Simplify".to_string(),
            follow_up_simplify_description: "Reduce this expression to its canonical form".to_string(),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_locale_has_stable_titles() {
        let locale = Locale::neutral();
        assert_eq!(locale.simplify_title, "Simplify");
        assert_eq!(locale.quadratic_discriminant_title, "Compute the discriminant");
    }
}
