//! The fixed C runtime preamble (spec §4.5 region (i)): tagged union,
//! 1024-cell stack, and the push/pop/op functions every generated
//! translation unit calls into. Ported from a line-by-line
//! `self._emit(...)` builder into a single raw string template.

pub const STACK_SIZE: usize = 1024;

/// Region (i): the runtime itself, with no `#include` of its own header
/// — used verbatim when the whole program is emitted as one
/// self-contained translation unit (no `-o`, spec §4.5 Open Question).
pub const RUNTIME_PREAMBLE: &str = r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <stdbool.h>

/* === Kapila Runtime === */

typedef enum { VAL_INT, VAL_FLOAT, VAL_BOOL, VAL_STR } ValueType;

typedef struct {
    ValueType type;
    union {
        long long i;
        double f;
        bool b;
        char *s;
    };
} Value;

#define STACK_SIZE 1024
static Value kp_stack[STACK_SIZE];
static int kp_sp = 0;

static void kp_panic(const char *msg) {
    fprintf(stderr, "ದೋಷ: %s\n", msg);
    exit(1);
}

static void kp_stack_init(void) { kp_sp = 0; }

static double kp_as_float(Value v) {
    return v.type == VAL_FLOAT ? v.f : (double)v.i;
}

static void kp_push_int(long long n) {
    kp_stack[kp_sp].type = VAL_INT;
    kp_stack[kp_sp].i = n;
    kp_sp++;
}

static void kp_push_float(double n) {
    kp_stack[kp_sp].type = VAL_FLOAT;
    kp_stack[kp_sp].f = n;
    kp_sp++;
}

static void kp_push_bool(bool b) {
    kp_stack[kp_sp].type = VAL_BOOL;
    kp_stack[kp_sp].b = b;
    kp_sp++;
}

static void kp_push_str(char *s) {
    kp_stack[kp_sp].type = VAL_STR;
    kp_stack[kp_sp].s = s;
    kp_sp++;
}

static Value kp_pop(void) { return kp_stack[--kp_sp]; }
static Value kp_peek(void) { return kp_stack[kp_sp - 1]; }

/* Arithmetic */
static void kp_add_op(void) {
    Value b = kp_pop(), a = kp_pop();
    if (a.type == VAL_FLOAT || b.type == VAL_FLOAT)
        kp_push_float((a.type == VAL_FLOAT ? a.f : a.i) + (b.type == VAL_FLOAT ? b.f : b.i));
    else
        kp_push_int(a.i + b.i);
}

static void kp_sub_op(void) {
    Value b = kp_pop(), a = kp_pop();
    if (a.type == VAL_FLOAT || b.type == VAL_FLOAT)
        kp_push_float((a.type == VAL_FLOAT ? a.f : a.i) - (b.type == VAL_FLOAT ? b.f : b.i));
    else
        kp_push_int(a.i - b.i);
}

static void kp_mul_op(void) {
    Value b = kp_pop(), a = kp_pop();
    if (a.type == VAL_FLOAT || b.type == VAL_FLOAT)
        kp_push_float((a.type == VAL_FLOAT ? a.f : a.i) * (b.type == VAL_FLOAT ? b.f : b.i));
    else
        kp_push_int(a.i * b.i);
}

static void kp_div_op(void) {
    Value b = kp_pop(), a = kp_pop();
    double bv = kp_as_float(b);
    if (bv == 0.0) kp_panic("ಶೂನ್ಯದಿಂದ ಭಾಗಾಕಾರ ಸಾಧ್ಯವಿಲ್ಲ");
    kp_push_float(kp_as_float(a) / bv);
}

static void kp_mod_op(void) {
    Value b = kp_pop(), a = kp_pop();
    if (b.i == 0) kp_panic("ಶೂನ್ಯದಿಂದ ಭಾಗಾಕಾರ ಸಾಧ್ಯವಿಲ್ಲ");
    kp_push_int(a.i % b.i);
}

/* Comparison: numeric operands are lifted to float if either side is
   float; string operands compare by content; mismatched non-numeric
   tags are a runtime error (spec §9 Open Question 4). */
static int kp_numeric(Value v) { return v.type == VAL_INT || v.type == VAL_FLOAT; }

static int kp_cmp(Value a, Value b) {
    if (kp_numeric(a) && kp_numeric(b)) {
        double av = kp_as_float(a), bv = kp_as_float(b);
        return av < bv ? -1 : (av > bv ? 1 : 0);
    }
    if (a.type == VAL_STR && b.type == VAL_STR) return strcmp(a.s, b.s);
    kp_panic("ಹೋಲಿಕೆ ಮಾಡಲಾಗದ ಬಗೆಗಳು");
    return 0;
}

static void kp_lt_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(kp_cmp(a, b) < 0); }
static void kp_gt_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(kp_cmp(a, b) > 0); }
static void kp_lte_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(kp_cmp(a, b) <= 0); }
static void kp_gte_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(kp_cmp(a, b) >= 0); }

static void kp_eq_op(void) {
    Value b = kp_pop(), a = kp_pop();
    bool eq;
    if (kp_numeric(a) && kp_numeric(b)) eq = kp_as_float(a) == kp_as_float(b);
    else if (a.type == VAL_STR && b.type == VAL_STR) eq = strcmp(a.s, b.s) == 0;
    else if (a.type == VAL_BOOL && b.type == VAL_BOOL) eq = a.b == b.b;
    else eq = false;
    kp_push_bool(eq);
}

static void kp_neq_op(void) {
    Value b = kp_pop(), a = kp_pop();
    bool eq;
    if (kp_numeric(a) && kp_numeric(b)) eq = kp_as_float(a) == kp_as_float(b);
    else if (a.type == VAL_STR && b.type == VAL_STR) eq = strcmp(a.s, b.s) == 0;
    else if (a.type == VAL_BOOL && b.type == VAL_BOOL) eq = a.b == b.b;
    else eq = false;
    kp_push_bool(!eq);
}

/* Logic */
static void kp_and_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(a.b && b.b); }
static void kp_or_op(void) { Value b = kp_pop(), a = kp_pop(); kp_push_bool(a.b || b.b); }
static void kp_not_op(void) { Value a = kp_pop(); kp_push_bool(!a.b); }

/* Stack ops */
static void kp_dup_op(void) { Value a = kp_peek(); kp_stack[kp_sp++] = a; }
static void kp_drop_op(void) { kp_sp--; }
static void kp_swap_op(void) { Value b = kp_pop(), a = kp_pop(); kp_stack[kp_sp++] = b; kp_stack[kp_sp++] = a; }

/* Print */
static void kp_print_op(void) {
    Value v = kp_pop();
    switch (v.type) {
        case VAL_INT: printf("%lld\n", v.i); break;
        case VAL_FLOAT: printf("%g\n", v.f); break;
        case VAL_BOOL: printf("%s\n", v.b ? "ಸರಿ" : "ತಪ್ಪು"); break;
        case VAL_STR: printf("%s\n", v.s); break;
    }
}

/* === Generated Code === */
"#;

/// Region (i) as it's written out when `-o <path>` is given: the same
/// content as [`RUNTIME_PREAMBLE`], wrapped in an include guard as a
/// standalone `kapila_runtime.h`. Every function in it is `static`, so a
/// single header is enough — the generated `<path>.c` gets
/// `#include "kapila_runtime.h"` instead of the runtime being inlined
/// above it (spec §4.5 Open Question resolution).
pub fn runtime_header() -> String {
    format!(
        "#ifndef KAPILA_RUNTIME_H\n#define KAPILA_RUNTIME_H\n\n{}\n\n#endif /* KAPILA_RUNTIME_H */\n",
        RUNTIME_PREAMBLE
    )
}
