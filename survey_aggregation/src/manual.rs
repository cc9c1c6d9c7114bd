/*!

This is the long-form manual for `survey_aggregation` and `cpadash`.

## Input columns

A dataset is a table with one row per answered question. The header of the
table is matched against the following names (case-insensitive, surrounding
spaces ignored). English aliases are accepted for every column. Columns that
are not listed here are ignored.

| Header            | Alias             | Content                                   |
|-------------------|-------------------|-------------------------------------------|
| `ID_PESQUISA`     | `survey_id`       | one identifier per respondent             |
| `RESPOSTA`        | `response_label`  | `Concordo`, `Discordo` or `Desconheço`    |
| `VALOR_RESPOSTA`  | `response_value`  | `1`, `-1` or `0`                          |
| `EIXO_NOME`       | `axis_name`       | display name of the evaluation axis       |
| `EIXO`            | `axis_code`       | internal code of the axis                 |
| `DIMENSAO_NOME`   | `dimension_name`  | dimension inside the axis                 |
| `ID_PERGUNTA`     | `question_id`     | question identifier                       |
| `PERGUNTA`        | `question_text`   | full question text                        |
| `CURSO`           | `course_name`     | course                                    |
| `SETOR_CURSO`     | `sector_name`     | sector of the course                      |
| `NOME_DISCIPLINA` | `discipline_name` | discipline                                |
| `MODALIDADE`      | `delivery_mode`   | `Presencial` or `EAD`                     |
| `UNIDADE GESTORA` | `managing_unit`   | managing unit of the survey               |
| `Ordem`           | `order`           | display order of the axes                 |

When both answer encodings are present the label wins. When only the axis
code is present, the display name is derived from it (`politicas_academicas`
becomes `Politicas Academicas`).

Every operation needs `ID_PESQUISA` and an answer column. Grouping by a
column, or filtering on it, needs that column too; otherwise the operation
fails with a missing column error. An empty selection is never an error.

## Filters

Each selector takes a single value, a list of values, or one of the "all"
sentinels (`All`, `Todos`, `Todas`, `Todas as disciplinas`). A sentinel
anywhere in a list releases the dimension. Values that cannot be understood
release the dimension as well and are reported as a warning in the logs.

Composite selectors pack several dimensions in one label:

* questions: `<axis> - <question text>`
* disciplines: `Disciplina: <discipline> - Curso: <course> - Setor: <sector>`

## Percentages

Summary percentages are computed over all the rows of the selection. A row
whose answer cannot be decoded counts as a row but under no label, so the
three summary percentages then add up to less than 100; the loader logs a
warning for each such row. The
shares of a grouped distribution and of the opinion balance are computed over
the answered rows of the group, so that they add up to 100. Any percentage
over nothing is 0.

The previous period values shown next to the summary are fixed placeholders
(500 respondents, 40 % agreement, 40 % disagreement, 20 % unknown) until real
historical exports are available.

## Command line

```text
cpadash --config dashboard.json --domain discipline --delivery-mode remote \
    --axis "Eixo 3 - Políticas Acadêmicas" --top-n 10 --out stdout
```

The configuration file lists the data sources of each domain:

```json
{
  "outputSettings": { "dashboardName": "CPA", "period": "2025/2", "outputPath": "summary.json" },
  "dataSources": [
    { "domain": "institutional", "provider": "xlsx", "filePath": "institucional.xlsx" },
    { "domain": "discipline", "deliveryMode": "remote", "provider": "csv", "filePath": "ead.csv" }
  ]
}
```

The `--course`, `--sector` and `--dimension-filter` options can be repeated
and take precedence over the segments of a `--discipline` label.

A single file can also be given directly with `--input` and `--input-type`.
The output is a JSON document with every chart series of the selected view.
With `--reference`, the output is compared against an earlier summary and the
differences are printed.

*/
