use crate::{
    CrankNicolson, DEFAULT_MAX_DEPTH, Expr, PdeSymbols, RowType, StencilError, Symbol,
    discretize_crank_nicolson, find_coefficients, symb, symb_get, symbol_exists,
};

#[test]
fn test_builder_configuration() {
    let vars = PdeSymbols::named("api_V", "api_dV", "api_Vx", "api_Vxx");
    let dx = symb("api_dx");

    // Defaults: normal row, "V" prefix
    let builder = CrankNicolson::new(dx);
    assert_eq!(builder.row_type(), RowType::Normal);
    assert_eq!(builder.step(), &dx.to_expr());

    let out = builder.discretize(&vars.value.to_expr(), &vars).unwrap();
    assert_eq!(out.row, RowType::Normal);
    assert_eq!(out.left.upper.display_name(), "V^u_l");

    // Row from a legacy string
    let row: RowType = "dn".parse().unwrap();
    let out = CrankNicolson::new(dx)
        .row(row)
        .discretize(&vars.second.to_expr(), &vars)
        .unwrap();
    assert_eq!(out.expr, Expr::number(0.0));
}

#[test]
fn test_unknown_row_type_is_an_error() {
    let err = "sideways".parse::<RowType>().unwrap_err();
    assert_eq!(err, StencilError::UnknownRowType("sideways".to_string()));
    assert_eq!(
        err.to_string(),
        "Unknown row type 'sideways': expected one of 'normal', 'up', 'dn'"
    );
}

#[test]
fn test_deep_model_rejected_by_default_limit() {
    let vars = PdeSymbols::named("api_deep_V", "api_deep_dV", "api_deep_Vx", "api_deep_Vxx");
    let mut model = vars.value.to_expr();
    for _ in 0..DEFAULT_MAX_DEPTH {
        model = model.pow_of(vars.first);
    }
    assert_eq!(
        CrankNicolson::new(0.1).discretize(&model, &vars),
        Err(StencilError::MaxDepthExceeded)
    );
}

#[test]
fn test_symbol_lookup() {
    let x = symb("api_lookup_x");
    assert!(symbol_exists("api_lookup_x"));
    assert_eq!(symb_get("api_lookup_x"), Ok(x));
    assert_eq!(
        symb_get("api_lookup_never_created"),
        Err(StencilError::UnknownSymbol("api_lookup_never_created".into()))
    );

    // Fresh symbols are not reachable by name
    let fresh = Symbol::fresh("api_lookup_fresh_only");
    assert!(!symbol_exists("api_lookup_fresh_only"));
    assert_eq!(fresh.name().as_deref(), Some("api_lookup_fresh_only"));
}

#[test]
fn test_discretize_then_extract() {
    // The composition external callers use: discretize, then read off each gridpoint
    let vars = PdeSymbols::named("api_comp_V", "api_comp_dV", "api_comp_Vx", "api_comp_Vxx");
    let dx = symb("api_comp_dx");
    let model = vars.change + vars.first;
    let out = discretize_crank_nicolson(&model, &vars, &dx.to_expr(), RowType::LowerBoundary);

    let coeffs = find_coefficients(&out.expr, &out.symbols());
    assert_eq!(coeffs.len(), 6);
    // Vx on the lower boundary uses the upper and middle points over dx
    assert_eq!(coeffs.get(&out.left.upper), Some(&(0.5 / dx)));
    assert_eq!(coeffs.get(&out.left.lower), Some(&Expr::number(0.0)));
    assert_eq!(coeffs.get(&out.right.lower), Some(&Expr::number(0.0)));
}

#[test]
fn test_latex_output() {
    let vars = PdeSymbols::named("api_tex_V", "api_tex_dV", "api_tex_Vx", "api_tex_Vxx");
    let out = CrankNicolson::new(symb("api_tex_dx"))
        .discretize(&vars.value.to_expr(), &vars)
        .unwrap();
    assert_eq!(out.expr.to_latex(), r"\frac{V^m_l + V^m_r}{2}");
}
